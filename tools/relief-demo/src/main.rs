//! relief-demo: synthetic terrain scene renderer.
//!
//! Usage:
//!   relief-demo --output relief.png
//!   relief-demo --size 257 --seed 42 --projection plan_oblique --output relief.png

use std::path::PathBuf;
use std::process;

use glam::{DVec2, DVec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use relief_core::{Color, RenderSettings};
use relief_render::{Camera, CameraPose, Projection, Renderer};
use relief_terrain::HeightField;
use relief_vector::{DrapeEngine, Geometry, Style, VectorFeature, VectorLayer};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h" || a == "help") {
        print_usage();
        return;
    }

    let size = parse_usize(&args, "--size", 257);
    let seed = parse_u64(&args, "--seed", 7);
    let image_size = parse_usize(&args, "--image-size", 800);
    let workers = parse_usize(&args, "--workers", 4);
    let output = parse_output(&args);
    let projection = match parse_projection(&args, size as f64 * 30.0) {
        Some(p) => p,
        None => {
            eprintln!("Error: unknown projection (use perspective, orthographic or plan_oblique)");
            process::exit(1);
        }
    };

    eprintln!("Generating {size}×{size} synthetic terrain (seed {seed})...");
    let field = generate_terrain(size, seed);

    let extent = (size - 1) as f64 * CELL_SIZE;
    let drape = demo_layers(extent);

    let center = DVec3::new(extent / 2.0, extent / 2.0, 0.0);
    let pose = CameraPose::new(center + DVec3::new(0.0, 0.0, extent), center);
    let camera = match Camera::new(image_size, image_size, pose, projection) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let settings = RenderSettings {
        workers,
        ..RenderSettings::default()
    };

    // Cartographic convention: light from the north-west.
    let light = DVec3::new(-1.0, 1.0, 1.5);
    let renderer = Renderer::new(field, drape, camera, light, settings);

    eprintln!("Rendering {image_size}×{image_size} with {workers} workers...");
    let start = std::time::Instant::now();
    let fb = renderer.render();
    eprintln!("Rendered in {:.2}s", start.elapsed().as_secs_f64());

    let image = image::RgbImage::from_raw(
        image_size as u32,
        image_size as u32,
        fb.to_srgb8(),
    )
    .expect("framebuffer dimensions match the image buffer");

    eprintln!("Writing {}...", output.display());
    if let Err(e) = image.save(&output) {
        eprintln!("Error writing image: {e}");
        process::exit(1);
    }
    eprintln!("Done! Output: {}", output.display());
}

fn print_usage() {
    eprintln!(
        "relief-demo: render a synthetic terrain scene to PNG\n\
         \n\
         Options:\n\
         \n\
           --size <N>         Elevation grid samples per side (default: 257)\n\
           --seed <N>         Terrain generator seed (default: 7)\n\
           --image-size <N>   Output image size in pixels (default: 800)\n\
           --workers <N>      Render worker threads (default: 4)\n\
           --projection <P>   perspective | orthographic | plan_oblique\n\
                              (default: plan_oblique)\n\
           --output <path>    Output PNG path (default: relief.png)\n\
         \n\
         Examples:\n\
         \n\
           relief-demo --seed 42 --output relief.png\n\
           relief-demo --projection perspective --image-size 1200 --output persp.png\n"
    );
}

fn parse_flag<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    for i in 0..args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return Some(&args[i + 1]);
        }
    }
    None
}

fn parse_usize(args: &[String], flag: &str, default: usize) -> usize {
    parse_flag(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_u64(args: &[String], flag: &str, default: u64) -> u64 {
    parse_flag(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_output(args: &[String]) -> PathBuf {
    parse_flag(args, "--output")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("relief.png"))
}

fn parse_projection(args: &[String], extent: f64) -> Option<Projection> {
    let half_extent = extent * 0.55;
    match parse_flag(args, "--projection").unwrap_or("plan_oblique") {
        "perspective" => Some(Projection::Perspective { fov: 0.9 }),
        "orthographic" => Some(Projection::Orthographic { half_extent }),
        "plan_oblique" => Some(Projection::PlanOblique {
            half_extent,
            tilt: 0.5,
            exaggeration: 1.5,
        }),
        _ => None,
    }
}

// --- Synthetic terrain ---

/// Ground sample spacing in meters.
const CELL_SIZE: f64 = 30.0;

/// Ridged sine terrain with seeded phase offsets: a couple of
/// mountain chains, rolling foothills, and a flat valley floor.
fn generate_terrain(size: usize, seed: u64) -> HeightField {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let phases: Vec<(f64, f64, f64)> = (0..4)
        .map(|i| {
            (
                rng.gen_range(0.0..std::f64::consts::TAU),
                rng.gen_range(0.0..std::f64::consts::TAU),
                600.0 / (i as f64 + 1.0),
            )
        })
        .collect();

    let mut samples = Vec::with_capacity(size * size);
    for row in 0..size {
        for col in 0..size {
            let nx = col as f64 / (size - 1) as f64;
            let ny = row as f64 / (size - 1) as f64;

            let mut elev = 0.0;
            for (i, &(px, py, amp)) in phases.iter().enumerate() {
                let f = (i + 2) as f64 * 2.5;
                // Ridged: fold the sine so crests become sharp.
                let s = ((nx * f + px).sin() * (ny * f * 0.8 + py).cos()).abs();
                elev += amp * (1.0 - s);
            }

            // Valley floor along the west edge.
            elev *= smooth_step(nx, 0.05, 0.35) * 0.8 + 0.2;
            samples.push(elev);
        }
    }

    HeightField::new(size, size, CELL_SIZE, DVec2::ZERO, samples)
        .expect("generator dimensions are valid")
}

fn smooth_step(x: f64, edge0: f64, edge1: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

// --- Demo vector layers ---

/// A river winding south to north through the valley, a lake, and a
/// straight road crossing the scene.
fn demo_layers(extent: f64) -> DrapeEngine {
    let river: Vec<DVec2> = (0..=64)
        .map(|i| {
            let t = i as f64 / 64.0;
            let x = extent * (0.18 + 0.06 * (t * 9.0).sin());
            DVec2::new(x, extent * t)
        })
        .collect();

    let lake: Vec<DVec2> = (0..24)
        .map(|i| {
            let a = i as f64 / 24.0 * std::f64::consts::TAU;
            let r = extent * (0.07 + 0.015 * (a * 3.0).sin());
            DVec2::new(extent * 0.22 + r * a.cos(), extent * 0.35 + r * a.sin())
        })
        .collect();

    let water = Color::new(0.25, 0.45, 0.75);
    let hydro = VectorLayer::new(
        "hydrography",
        vec![
            VectorFeature::new(
                Geometry::Polygon(lake),
                Style {
                    stroke_width: extent * 0.002,
                    stroke_color: water * 0.7,
                    fill_color: Some(water),
                    feather: extent * 0.001,
                    opacity: 0.9,
                },
            ),
            VectorFeature::new(
                Geometry::Polyline(river),
                Style {
                    stroke_width: extent * 0.004,
                    stroke_color: water,
                    fill_color: None,
                    feather: extent * 0.001,
                    opacity: 0.9,
                },
            ),
        ],
    );

    let roads = VectorLayer::new(
        "roads",
        vec![VectorFeature::new(
            Geometry::Polyline(vec![
                DVec2::new(0.0, extent * 0.6),
                DVec2::new(extent, extent * 0.72),
            ]),
            Style {
                stroke_width: extent * 0.003,
                stroke_color: Color::new(0.75, 0.3, 0.15),
                fill_color: None,
                feather: extent * 0.0008,
                opacity: 1.0,
            },
        )],
    );

    DrapeEngine::new(vec![hydro, roads])
}
