//! Two drawables sharing one cube mesh, exported to JSON and imported again.
//!
//! Run with `RUST_LOG=debug` to watch the exporter reuse the mesh name and the
//! importer construct it once.

use std::f32::consts::FRAC_PI_2;

use scene_ngin::{
    ContainerNode, Context, Drawable, Quaternion, SceneNode, Transform, Vector3,
    resources::{BasicMaterial, Mesh},
};

fn cube(name: &str) -> Mesh {
    let positions = vec![
        [-0.5, -0.5, -0.5],
        [0.5, -0.5, -0.5],
        [0.5, 0.5, -0.5],
        [-0.5, 0.5, -0.5],
        [-0.5, -0.5, 0.5],
        [0.5, -0.5, 0.5],
        [0.5, 0.5, 0.5],
        [-0.5, 0.5, 0.5],
    ];
    #[rustfmt::skip]
    let indices = vec![
        0, 2, 1, 0, 3, 2,
        4, 5, 6, 4, 6, 7,
        0, 1, 5, 0, 5, 4,
        3, 6, 2, 3, 7, 6,
        0, 4, 7, 0, 7, 3,
        1, 2, 6, 1, 6, 5,
    ];
    let mut mesh = Mesh::new(name).with_geometry(positions, indices);
    mesh.compute_normals();
    mesh
}

fn main() -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let mut ctx = Context::new().configure(|ctx| ctx.export.pretty = true);
    let mesh = ctx.resources.add_mesh(cube("cube"));
    let red = ctx
        .resources
        .add_material(BasicMaterial::new("red").with_color(1.0, 0.0, 0.0));

    let mut turned = Transform::from(Vector3::new(2.0, 0.0, 0.0));
    turned
        .rotation
        .set_axis_angle(Vector3::new(0.0, 1.0, 0.0), FRAC_PI_2);

    let mut left = Drawable::new("left").with_mesh(mesh);
    left.set_material(red);
    let right = Drawable::new("right")
        .with_mesh(mesh)
        .with_transform(turned);

    let mut root = ContainerNode::new("root");
    root.add_child(Box::new(left));
    root.add_child(Box::new(right));
    root.update_world_transform_all();

    let json = ctx.export_json(&root)?;
    println!("{}", json);

    let mut imported_ctx = Context::new();
    let imported = imported_ctx.import_json(&json)?;
    println!(
        "Imported {} request(s) into {} resource(s), complete: {}",
        imported.report.requested,
        imported.report.resolved,
        imported.report.is_complete()
    );

    for child in imported.root.get_children() {
        let Some(renderable) = child.as_renderable() else {
            continue;
        };
        let rotation: Quaternion = child.get_world_transform().rotation;
        println!(
            "{}: mesh {:?}, material {:?}, world rotation {}",
            child.name(),
            renderable.mesh(),
            renderable.material(),
            rotation
        );
    }
    Ok(())
}
