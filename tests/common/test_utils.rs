#![allow(dead_code)]

use std::collections::HashSet;

use scene_ngin::{
    ContainerNode, Context, Drawable, MeshHandle, Quaternion, SceneNode, Vector3,
    error::ExportError,
    export::{Exporter, SceneExporter},
    record::NodeRecord,
    resources::{Mesh, ResourceRef},
};

pub const EPSILON: f32 = 1e-5;

pub fn assert_quat_eq(actual: &Quaternion, expected: &Quaternion) {
    let close = actual
        .as_array()
        .iter()
        .zip(expected.as_array())
        .all(|(a, e)| (a - e).abs() < EPSILON);
    assert!(close, "expected {} but got {}", expected, actual);
}

/// `q` and `-q` describe the same rotation.
pub fn assert_same_rotation(actual: &Quaternion, expected: &Quaternion) {
    let negated = Quaternion::new(-expected.x, -expected.y, -expected.z, -expected.w);
    let close = |target: &Quaternion| {
        actual
            .as_array()
            .iter()
            .zip(target.as_array())
            .all(|(a, e)| (a - e).abs() < EPSILON)
    };
    assert!(
        close(expected) || close(&negated),
        "expected {} (or its negation) but got {}",
        expected,
        actual
    );
}

pub fn axis_angle(x: f32, y: f32, z: f32, angle: f32) -> Quaternion {
    let mut q = Quaternion::default();
    q.set_axis_angle(Vector3::new(x, y, z), angle);
    q
}

pub fn triangle_mesh(name: &str) -> Mesh {
    Mesh::new(name).with_geometry(
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        vec![0, 1, 2],
    )
}

/// A root with two drawables that share one mesh and the default material.
pub fn shared_mesh_scene(ctx: &mut Context) -> (ContainerNode, MeshHandle) {
    let mesh = ctx.resources.add_mesh(triangle_mesh("cube"));
    let mut root = ContainerNode::new("root");
    root.add_child(Box::new(Drawable::new("first").with_mesh(mesh)));
    root.add_child(Box::new(Drawable::new("second").with_mesh(mesh)));
    (root, mesh)
}

/// Forwards to a [`SceneExporter`] and remembers every `also_save` call.
pub struct CountingExporter<'a> {
    pub inner: SceneExporter<'a>,
    pub calls: Vec<ResourceRef>,
}

impl<'a> CountingExporter<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self {
            inner: SceneExporter::new(&ctx.resources),
            calls: vec![],
        }
    }

    pub fn distinct(&self) -> usize {
        self.calls.iter().collect::<HashSet<_>>().len()
    }

    pub fn calls_for(&self, resource: ResourceRef) -> usize {
        self.calls.iter().filter(|call| **call == resource).count()
    }
}

impl Exporter for CountingExporter<'_> {
    fn also_save(&mut self, resource: ResourceRef) -> Result<String, ExportError> {
        self.calls.push(resource);
        self.inner.also_save(resource)
    }

    fn save_node(&mut self, node: &dyn SceneNode) -> Result<NodeRecord, ExportError> {
        let data = node.get_export_data(self)?;
        let children = node
            .get_children()
            .iter()
            .map(|child| self.save_node(child.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(NodeRecord {
            kind: node.kind().to_string(),
            data,
            children,
        })
    }
}
