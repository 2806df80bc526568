use std::{cell::RefCell, rc::Rc};

use scene_ngin::{
    ContainerNode, Context, Drawable, ImportError, MaterialHandle, Renderable, SceneNode,
    Transform, UnresolvedPolicy, Vector3,
    data_structures::scene_graph::node_at_path,
    error::{ExportError, MissingReference},
    export::Exporter,
    import::{ImportRegistry, Importer, SceneImporter},
    record::{NodeRecord, SceneDocument},
    resources::{BasicMaterial, ResourceKind, ResourceRef},
};

use crate::common::test_utils::{shared_mesh_scene, triangle_mesh};

mod common;

fn renderable_at<'a>(root: &'a dyn SceneNode, path: &[usize]) -> &'a dyn Renderable {
    node_at_path(root, path)
        .and_then(|node| node.as_renderable())
        .expect("renderable node")
}

#[test_log::test]
fn should_restore_tree_and_transforms() -> anyhow::Result<()> {
    let mut ctx = Context::new();
    let mesh = ctx.resources.add_mesh(triangle_mesh("cube"));
    let mut root = ContainerNode::new("root")
        .with_transform(Transform::from(Vector3::new(0.0, 1.0, 0.0)));
    let mut group = ContainerNode::new("group");
    group.add_child(Box::new(
        Drawable::new("leaf")
            .with_mesh(mesh)
            .with_transform(Transform::from(Vector3::new(2.0, 0.0, 0.0))),
    ));
    root.add_child(Box::new(group));
    let document = ctx.export_scene(&root)?;

    let mut imported_ctx = Context::new();
    let imported = imported_ctx.import_scene(&document)?;

    let root = imported.root.as_ref();
    assert_eq!(root.kind(), ContainerNode::KIND);
    assert_eq!(root.name(), "root");
    let leaf = node_at_path(root, &[0, 0]).expect("leaf node");
    assert_eq!(leaf.kind(), Drawable::KIND);
    assert_eq!(leaf.name(), "leaf");
    assert_eq!(leaf.get_local_transform().position, Vector3::new(2.0, 0.0, 0.0));
    assert_eq!(leaf.get_world_transform().position, Vector3::new(2.0, 1.0, 0.0));
    Ok(())
}

#[test_log::test]
fn should_resolve_shared_name_to_one_resource() -> anyhow::Result<()> {
    let mut ctx = Context::new();
    let (root, _) = shared_mesh_scene(&mut ctx);
    let document = ctx.export_scene(&root)?;

    let mut imported_ctx = Context::new();
    let meshes_before = imported_ctx.resources.mesh_count();
    let imported = imported_ctx.import_scene(&document)?;

    let first = renderable_at(imported.root.as_ref(), &[0]);
    let second = renderable_at(imported.root.as_ref(), &[1]);
    assert!(first.mesh().is_some());
    assert_eq!(first.mesh(), second.mesh());
    assert_eq!(first.material(), second.material());
    assert_eq!(imported_ctx.resources.mesh_count(), meshes_before + 1);

    let mesh = imported_ctx
        .resources
        .mesh(first.mesh().expect("mesh handle"))
        .expect("mesh in table");
    assert_eq!(mesh.name, "cube");
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.triangle_count(), 1);
    assert_eq!(imported_ctx.resources.find_mesh("cube"), first.mesh());
    Ok(())
}

#[test_log::test]
fn should_fire_every_callback_once_before_completion() -> anyhow::Result<()> {
    let mut ctx = Context::new();
    let (mut root, mesh) = shared_mesh_scene(&mut ctx);
    let red = ctx.resources.add_material(BasicMaterial::new("red"));
    let mut third = Drawable::new("third").with_mesh(mesh);
    third.set_material(red);
    root.add_child(Box::new(third));
    let document = ctx.export_scene(&root)?;

    let mut imported_ctx = Context::new();
    let imported = imported_ctx.import_scene(&document)?;

    // three drawables with a mesh and a material each
    assert_eq!(imported.report.requested, 6);
    assert_eq!(imported.report.callbacks_fired, 6);
    // cube, basic and red
    assert_eq!(imported.report.resolved, 3);
    assert!(imported.report.missing.is_empty());
    assert!(imported.report.is_complete());

    let third = renderable_at(imported.root.as_ref(), &[2]);
    let material = imported_ctx
        .resources
        .material(third.material())
        .expect("material in table");
    assert_eq!(material.name(), "red");
    Ok(())
}

#[test_log::test]
fn should_fail_session_on_missing_reference_by_default() -> anyhow::Result<()> {
    let mut ctx = Context::new();
    let (root, _) = shared_mesh_scene(&mut ctx);
    let mut document = ctx.export_scene(&root)?;
    document.resources.retain(|record| record.kind != ResourceKind::Mesh);

    let mut imported_ctx = Context::new();
    let result = imported_ctx.import_scene(&document);

    let Err(ImportError::Unresolved(missing)) = result else {
        panic!("expected an unresolved reference error");
    };
    assert_eq!(
        missing,
        vec![
            MissingReference {
                name: "cube".to_string(),
                kind: ResourceKind::Mesh,
                node: vec![0],
            },
            MissingReference {
                name: "cube".to_string(),
                kind: ResourceKind::Mesh,
                node: vec![1],
            },
        ]
    );
    Ok(())
}

#[test_log::test]
fn should_leave_resource_table_untouched_when_references_are_missing() -> anyhow::Result<()> {
    let mut ctx = Context::new();
    let (mut root, mesh) = shared_mesh_scene(&mut ctx);
    let red = ctx.resources.add_material(BasicMaterial::new("red"));
    let mut third = Drawable::new("third").with_mesh(mesh);
    third.set_material(red);
    root.add_child(Box::new(third));
    let mut document = ctx.export_scene(&root)?;
    document.resources.retain(|record| record.kind != ResourceKind::Mesh);

    let mut imported_ctx = Context::new();
    let meshes_before = imported_ctx.resources.mesh_count();
    let materials_before = imported_ctx.resources.material_count();
    let result = imported_ctx.import_scene(&document);

    assert!(matches!(result, Err(ImportError::Unresolved(_))));
    assert_eq!(imported_ctx.resources.mesh_count(), meshes_before);
    assert_eq!(imported_ctx.resources.material_count(), materials_before);
    assert_eq!(imported_ctx.resources.find_material("red"), None);
    Ok(())
}

#[test_log::test]
fn should_leave_resource_table_untouched_when_a_later_resource_fails() -> anyhow::Result<()> {
    let mut ctx = Context::new();
    let cube = ctx.resources.add_mesh(triangle_mesh("cube"));
    let other = ctx.resources.add_mesh(triangle_mesh("other"));
    let mut root = ContainerNode::new("root");
    root.add_child(Box::new(Drawable::new("a").with_mesh(cube)));
    root.add_child(Box::new(Drawable::new("b").with_mesh(other)));
    let mut document = ctx.export_scene(&root)?;
    for record in document.resources.iter_mut() {
        if record.name == "other" {
            record.kind = ResourceKind::Material;
        }
    }

    let mut imported_ctx = Context::new();
    let result = imported_ctx.import_scene(&document);

    assert!(matches!(result, Err(ImportError::KindMismatch { name, .. }) if name == "other"));
    assert_eq!(imported_ctx.resources.mesh_count(), 0);
    assert_eq!(imported_ctx.resources.material_count(), 1);
    assert_eq!(imported_ctx.resources.find_mesh("cube"), None);
    Ok(())
}

#[test_log::test]
fn should_keep_disambiguated_names_on_import() -> anyhow::Result<()> {
    let mut ctx = Context::new();
    let first = ctx.resources.add_mesh(triangle_mesh("cube"));
    let second = ctx.resources.add_mesh(triangle_mesh("cube"));
    let mut root = ContainerNode::new("root");
    root.add_child(Box::new(Drawable::new("a").with_mesh(first)));
    root.add_child(Box::new(Drawable::new("b").with_mesh(second)));
    let document = ctx.export_scene(&root)?;

    let mut imported_ctx = Context::new();
    let imported = imported_ctx.import_scene(&document)?;

    let a = renderable_at(imported.root.as_ref(), &[0]);
    let b = renderable_at(imported.root.as_ref(), &[1]);
    assert_ne!(a.mesh(), b.mesh());
    assert_eq!(imported_ctx.resources.find_mesh("cube"), a.mesh());
    assert_eq!(imported_ctx.resources.find_mesh("cube (1)"), b.mesh());
    Ok(())
}

#[test_log::test]
fn should_resolve_siblings_when_skipping_missing_references() -> anyhow::Result<()> {
    let mut ctx = Context::new();
    let lost = ctx.resources.add_mesh(triangle_mesh("lost"));
    let kept = ctx.resources.add_mesh(triangle_mesh("kept"));
    let mut root = ContainerNode::new("root");
    root.add_child(Box::new(Drawable::new("broken").with_mesh(lost)));
    root.add_child(Box::new(Drawable::new("fine").with_mesh(kept)));
    let mut document = ctx.export_scene(&root)?;
    document.resources.retain(|record| record.name != "lost");

    let mut imported_ctx =
        Context::new().configure(|ctx| ctx.import.unresolved = UnresolvedPolicy::Skip);
    let imported = imported_ctx.import_scene(&document)?;

    assert!(!imported.report.is_complete());
    assert_eq!(imported.report.missing.len(), 1);
    assert_eq!(imported.report.missing[0].name, "lost");
    assert_eq!(imported.report.missing[0].node, vec![0]);
    assert_eq!(imported.report.callbacks_fired, 3);

    let broken = renderable_at(imported.root.as_ref(), &[0]);
    assert_eq!(broken.mesh(), None);
    let fine = renderable_at(imported.root.as_ref(), &[1]);
    assert!(fine.mesh().is_some());
    assert_eq!(broken.material(), fine.material());
    Ok(())
}

#[test]
fn should_reject_unknown_node_kind() {
    let document = SceneDocument {
        root: NodeRecord {
            kind: "Teapot".to_string(),
            data: serde_json::json!({}),
            children: vec![],
        },
        resources: vec![],
    };

    let result = Context::new().import_scene(&document);

    assert!(matches!(result, Err(ImportError::UnknownNodeKind(kind)) if kind == "Teapot"));
}

#[test_log::test]
fn should_reject_resource_of_wrong_kind() -> anyhow::Result<()> {
    let mut ctx = Context::new();
    let (root, _) = shared_mesh_scene(&mut ctx);
    let mut document = ctx.export_scene(&root)?;
    for record in document.resources.iter_mut() {
        if record.name == "cube" {
            record.kind = ResourceKind::Material;
        }
    }

    let result = Context::new().import_scene(&document);

    assert!(matches!(
        result,
        Err(ImportError::KindMismatch {
            expected: ResourceKind::Mesh,
            found: ResourceKind::Material,
            ..
        })
    ));
    Ok(())
}

#[test]
fn should_reject_unregistered_material_type() -> anyhow::Result<()> {
    let ctx = Context::new();
    let document = ctx.export_scene(&Drawable::new("box"))?;

    let mut imported_ctx = Context::new().configure(|ctx| {
        let mut registry = ImportRegistry::empty();
        registry.register_node(Drawable::KIND, || Box::new(Drawable::default()));
        ctx.registry = registry;
    });
    let result = imported_ctx.import_scene(&document);

    assert!(
        matches!(result, Err(ImportError::UnknownMaterialKind(kind)) if kind == BasicMaterial::KIND)
    );
    Ok(())
}

#[test_log::test]
fn should_round_trip_json_through_context() -> anyhow::Result<()> {
    let mut ctx = Context::new();
    let (root, _) = shared_mesh_scene(&mut ctx);
    let json = ctx.export_json(&root)?;

    let mut imported_ctx = Context::new();
    let imported = imported_ctx.import_json(&json)?;
    let document = imported_ctx.export_scene(imported.root.as_ref())?;

    assert_eq!(document.root.children.len(), 2);
    let mut names: Vec<_> = document.resources.iter().map(|r| r.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["basic", "cube"]);
    Ok(())
}

/// A node that records what the importer handed to it.
struct Recorder {
    node: ContainerNode,
    received: Rc<RefCell<Vec<ResourceRef>>>,
}

impl SceneNode for Recorder {
    fn kind(&self) -> &'static str {
        "Recorder"
    }

    fn name(&self) -> &str {
        self.node.name()
    }

    fn set_name(&mut self, name: &str) {
        self.node.set_name(name);
    }

    fn get_local_transform(&self) -> &Transform {
        self.node.get_local_transform()
    }

    fn set_local_transform(&mut self, transform: Transform) {
        self.node.set_local_transform(transform);
    }

    fn get_world_transform(&self) -> &Transform {
        self.node.get_world_transform()
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        self.node.get_children()
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        self.node.get_children_mut()
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.node.add_child(child);
    }

    fn update_world_transforms(&mut self, parents_world_transform: &Transform) {
        self.node.update_world_transforms(parents_world_transform);
    }

    fn get_export_data(
        &self,
        exporter: &mut dyn Exporter,
    ) -> Result<serde_json::Value, ExportError> {
        self.node.get_export_data(exporter)
    }

    fn set_import_data(
        &mut self,
        importer: &mut dyn Importer,
        _data: &serde_json::Value,
    ) -> Result<(), ImportError> {
        for _ in 0..2 {
            let received = self.received.clone();
            importer.load(
                "basic",
                ResourceKind::Material,
                Box::new(move |_node: &mut dyn SceneNode, resource: ResourceRef| {
                    received.borrow_mut().push(resource)
                }),
            );
        }
        Ok(())
    }
}

#[test_log::test]
fn should_queue_callbacks_until_finish() -> anyhow::Result<()> {
    let ctx = Context::new();
    let document = ctx.export_scene(&Drawable::new("box"))?;
    let registry = ImportRegistry::default();
    let mut resources = scene_ngin::Resources::new();
    let received = Rc::new(RefCell::new(vec![]));

    let mut importer = SceneImporter::new(
        &document,
        &registry,
        &mut resources,
        UnresolvedPolicy::Fail,
    );
    let mut recorder = Recorder {
        node: ContainerNode::new("recorder"),
        received: received.clone(),
    };
    recorder.set_import_data(&mut importer, &serde_json::Value::Null)?;
    let mut root: Box<dyn SceneNode> = Box::new(recorder);

    assert_eq!(importer.pending_count(), 2);
    assert!(received.borrow().is_empty());

    let report = importer.finish(root.as_mut())?;

    assert!(report.is_complete());
    assert_eq!(report.resolved, 1);
    let received = received.borrow();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0], received[1]);
    assert_ne!(received[0], ResourceRef::Material(MaterialHandle::DEFAULT));
    Ok(())
}
