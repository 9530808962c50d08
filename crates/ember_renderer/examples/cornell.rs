//! Renders a procedural Cornell box to cornell.png.
//!
//! Run with `RUST_LOG=info cargo run --release --example cornell`.

use anyhow::Result;
use ember_renderer::{
    Camera, MaterialParams, MeshData, Point, RenderSettings, Scene, SceneData, Vec2, Vec3,
};

/// One quad as a two-triangle mesh. The shared normal comes from the
/// winding, so list the corners counter-clockwise as seen from the side
/// the normal should face.
fn quad(corners: [Vec3; 4], material: MaterialParams) -> MeshData {
    let normal = (corners[1] - corners[0])
        .cross(corners[2] - corners[0])
        .normalize();
    let uvs = [
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];
    let p: Vec<Point> = corners
        .iter()
        .zip(uvs)
        .map(|(&c, uv)| Point::new(c, normal, uv))
        .collect();
    MeshData::new(vec![[p[0], p[1], p[2]], [p[0], p[2], p[3]]], material)
}

/// An axis-aligned box with outward normals, as a single mesh.
fn cube(min: Vec3, max: Vec3, material: MaterialParams) -> MeshData {
    let corner = |x, y, z| {
        Vec3::new(
            if x { max.x } else { min.x },
            if y { max.y } else { min.y },
            if z { max.z } else { min.z },
        )
    };
    let faces = [
        // -z and +z
        [
            corner(false, false, false),
            corner(false, true, false),
            corner(true, true, false),
            corner(true, false, false),
        ],
        [
            corner(false, false, true),
            corner(true, false, true),
            corner(true, true, true),
            corner(false, true, true),
        ],
        // -y and +y
        [
            corner(false, false, false),
            corner(true, false, false),
            corner(true, false, true),
            corner(false, false, true),
        ],
        [
            corner(false, true, false),
            corner(false, true, true),
            corner(true, true, true),
            corner(true, true, false),
        ],
        // -x and +x
        [
            corner(false, false, false),
            corner(false, false, true),
            corner(false, true, true),
            corner(false, true, false),
        ],
        [
            corner(true, false, false),
            corner(true, true, false),
            corner(true, true, true),
            corner(true, false, true),
        ],
    ];

    let mut triangles = Vec::with_capacity(12);
    for face in faces {
        let data = quad(face, material.clone());
        triangles.extend(data.triangles);
    }
    MeshData::new(triangles, material)
}

fn main() -> Result<()> {
    env_logger::init();

    let white = Vec3::splat(0.73);
    let red = Vec3::new(0.65, 0.05, 0.05);
    let green = Vec3::new(0.12, 0.45, 0.15);

    let mut data = SceneData::new();
    // Floor, ceiling, back wall
    data.push(quad(
        [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(555.0, 0.0, 0.0),
            Vec3::new(555.0, 0.0, 555.0),
            Vec3::new(0.0, 0.0, 555.0),
        ],
        MaterialParams::diffuse("floor", white),
    ));
    data.push(quad(
        [
            Vec3::new(0.0, 555.0, 0.0),
            Vec3::new(0.0, 555.0, 555.0),
            Vec3::new(555.0, 555.0, 555.0),
            Vec3::new(555.0, 555.0, 0.0),
        ],
        MaterialParams::diffuse("ceiling", white),
    ));
    data.push(quad(
        [
            Vec3::new(0.0, 0.0, 555.0),
            Vec3::new(555.0, 0.0, 555.0),
            Vec3::new(555.0, 555.0, 555.0),
            Vec3::new(0.0, 555.0, 555.0),
        ],
        MaterialParams::diffuse("back", white),
    ));
    // Red left wall, green right wall
    data.push(quad(
        [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 555.0),
            Vec3::new(0.0, 555.0, 555.0),
            Vec3::new(0.0, 555.0, 0.0),
        ],
        MaterialParams::diffuse("left", red),
    ));
    data.push(quad(
        [
            Vec3::new(555.0, 0.0, 0.0),
            Vec3::new(555.0, 555.0, 0.0),
            Vec3::new(555.0, 555.0, 555.0),
            Vec3::new(555.0, 0.0, 555.0),
        ],
        MaterialParams::diffuse("right", green),
    ));

    // Ceiling light, promoted to an area light by name
    data.push(quad(
        [
            Vec3::new(213.0, 554.0, 227.0),
            Vec3::new(213.0, 554.0, 332.0),
            Vec3::new(343.0, 554.0, 332.0),
            Vec3::new(343.0, 554.0, 227.0),
        ],
        MaterialParams::diffuse("light", Vec3::ZERO),
    ));
    data.override_emissive("light", Vec3::new(18.4, 15.6, 8.0));

    // A glossy tall box and a glass short box
    data.push(cube(
        Vec3::new(265.0, 0.0, 295.0),
        Vec3::new(430.0, 330.0, 460.0),
        MaterialParams {
            specular: Vec3::splat(0.4),
            shininess: 32.0,
            ..MaterialParams::diffuse("tall", Vec3::splat(0.35))
        },
    ));
    data.push(cube(
        Vec3::new(130.0, 0.0, 65.0),
        Vec3::new(295.0, 165.0, 230.0),
        MaterialParams {
            transmittance: Vec3::ONE,
            ior: 1.5,
            ..MaterialParams::diffuse("glass", Vec3::ZERO)
        },
    ));

    let settings = RenderSettings {
        // Scene units are centimeters; a loose epsilon keeps shadow rays
        // off their own surface
        epsilon: 1e-3,
        samples_per_pixel: 32,
        ..RenderSettings::default()
    };
    let passes = settings.samples_per_pixel;

    let scene = Scene::new(data, settings)?;
    let camera = Camera::new(
        Vec3::new(278.0, 273.0, -800.0),
        Vec3::new(278.0, 273.0, 0.0),
        Vec3::Y,
        39.3,
        512,
        512,
    );

    let film = scene.render(&camera);
    film.resolve(passes, 2.2).save("cornell.png")?;
    log::info!("wrote cornell.png");
    Ok(())
}
