use clap::Parser;

use rusty_iris::args::Args;
use rusty_iris::camera::CameraSource;
use rusty_iris::config::AppConfig;
use rusty_iris::draw;
use rusty_iris::face_mesh::FaceMesh;
use rusty_iris::font;
use rusty_iris::fps::FpsCounter;
use rusty_iris::iris::IrisLandmark;
use rusty_iris::output::WindowOutput;
use rusty_iris::pipeline::IrisPipeline;
use rusty_iris::ttf::FontRenderer;

const FACE_DETECTOR_MODEL: &str = "models/face_detection.onnx";
const FACE_MESH_MODEL: &str = "models/face_mesh.onnx";
const IRIS_MODEL: &str = "models/iris_landmark.onnx";

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.list {
        let cameras = nokhwa::query(nokhwa::utils::ApiBackend::Auto)?;
        println!("Available Cameras:");
        println!("{:<5} | {:<30} | {:<10}", "Index", "Name", "Misc");
        println!("{}", "-".repeat(60));
        for cam in cameras {
            println!(
                "{:<5} | {:<30} | {:?}",
                cam.index(),
                cam.human_name(),
                cam.misc()
            );
        }
        return Ok(());
    }

    // 0. Config
    let config = AppConfig::load()?;

    // 1. Camera
    let mut camera = CameraSource::new(args.device, args.width, args.height)?;
    println!("Using camera: {}", camera.name());

    // 2. Models
    let face_mesh = FaceMesh::new(
        FACE_DETECTOR_MODEL,
        FACE_MESH_MODEL,
        args.min_detection_confidence,
        args.max_num_faces,
    )?;
    let iris = IrisLandmark::new(IRIS_MODEL)?;
    let mut pipeline =
        IrisPipeline::new(Box::new(face_mesh), Box::new(iris)).with_failure_logging(args.verbose);

    // 3. Window
    let width = camera.width();
    let height = camera.height();
    let mut window = WindowOutput::new("Rusty Iris", width as usize, height as usize)?;

    let mut fps = FpsCounter::new(10);
    let font_renderer = FontRenderer::try_load(&config.ui.font_family);

    // Feature toggles (loaded from config)
    let mut show_landmarks = config.defaults.show_landmarks;
    let mut show_circle = config.defaults.show_circle;
    let mut show_regions = config.defaults.show_regions;
    let mut show_fps = config.defaults.show_fps;
    let mut mirror_mode = config.defaults.mirror_mode || args.mirror;

    let circle_color = draw::parse_hex(&config.ui.circle_color_hex);
    let point_color = draw::parse_hex(&config.ui.point_color_hex);
    let label_color = draw::parse_hex(&config.ui.label_color_hex);

    println!("Starting pipeline...");
    println!("Controls: [1] Landmarks [2] Circles [3] Regions [4] FPS [5] Mirror [ESC] Quit");

    // 4. Loop
    while window.is_open() && !window.is_key_down(minifb::Key::Escape) {
        let display_fps = fps.tick();

        // --- CAPTURE ---
        let mut frame = match camera.capture() {
            Ok(f) => f,
            Err(_) => continue,
        };
        if mirror_mode {
            image::imageops::flip_horizontal_in_place(&mut frame);
        }

        let (width, height) = frame.dimensions();
        let mut display_buffer = frame.to_vec();

        // --- INPUT ---
        for key in window.keys_pressed() {
            match key {
                minifb::Key::Key1 => show_landmarks = !show_landmarks,
                minifb::Key::Key2 => show_circle = !show_circle,
                minifb::Key::Key3 => show_regions = !show_regions,
                minifb::Key::Key4 => show_fps = !show_fps,
                minifb::Key::Key5 => mirror_mode = !mirror_mode,
                _ => {}
            }
        }

        // --- PROCESSING ---
        // A face-detector error skips this frame's annotations but keeps the
        // loop alive; per-eye failures are already handled inside.
        let tracks = match pipeline.process(&frame) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("[Pipeline] {:#}", e);
                Vec::new()
            }
        };

        let draw_text = |buf: &mut [u8], x: usize, y: usize, txt: &str, col: (u8, u8, u8)| {
            if let Some(fr) = &font_renderer {
                fr.draw_text(
                    buf,
                    width as usize,
                    height as usize,
                    x,
                    y,
                    txt,
                    col,
                    config.ui.font_size_pt as f32,
                );
            } else {
                font::draw_text_line(
                    buf,
                    width as usize,
                    height as usize,
                    x,
                    y,
                    txt,
                    col,
                    config.ui.menu_scale,
                );
            }
        };

        // --- DRAWING ---
        for track in &tracks {
            if show_regions {
                for bbox in [&track.left_bbox, &track.right_bbox] {
                    draw::draw_rect_outline(
                        &mut display_buffer,
                        width as usize,
                        height as usize,
                        bbox,
                        (255, 255, 0),
                    );
                }
            }

            for (side, eye) in [("left", &track.left), ("right", &track.right)] {
                let Some(eye) = eye else { continue };

                if show_circle {
                    draw::draw_circle_outline(
                        &mut display_buffer,
                        width as usize,
                        height as usize,
                        &eye.circle,
                        circle_color,
                        2,
                    );

                    let label = format!("r:{}px", eye.circle.radius);
                    let lx = eye.circle.cx + (eye.circle.radius as f32 * 1.5) as i32;
                    let ly = eye.circle.cy + (eye.circle.radius as f32 * 0.5) as i32;
                    if lx >= 0 && ly >= 0 {
                        draw_text(&mut display_buffer, lx as usize, ly as usize, &label, label_color);
                    }
                }

                if show_landmarks {
                    for p in &eye.points {
                        draw::draw_point(
                            &mut display_buffer,
                            width as usize,
                            height as usize,
                            p.x,
                            p.y,
                            1,
                            point_color,
                        );
                    }
                }

                if args.verbose {
                    for p in &eye.points {
                        println!("{} eye ({}, {})", side, p.x, p.y);
                    }
                }
            }
        }

        if show_fps {
            draw_text(
                &mut display_buffer,
                10,
                10,
                &format!("FPS:{:.2}", display_fps),
                label_color,
            );
        }

        // --- MENU ---
        let menu_items = [
            ("1", "Landmarks", show_landmarks),
            ("2", "Circles", show_circle),
            ("3", "Regions", show_regions),
            ("4", "FPS", show_fps),
            ("5", "Mirror", mirror_mode),
        ];

        let line_height = if let Some(fr) = &font_renderer {
            fr.measure_height(config.ui.font_size_pt as f32) + 5
        } else {
            12 * config.ui.menu_scale
        };

        let mut y_start = height as usize / 2;
        for (key, label, active) in menu_items.iter() {
            let color = if *active { (0, 255, 0) } else { (255, 255, 255) };
            let status = if *active { "ON" } else { "OFF" };
            let text = format!("[{}] {} [{}]", key, label, status);
            draw_text(&mut display_buffer, 10, y_start, &text, color);
            y_start += line_height;
        }

        // --- WINDOW UPDATE ---
        window.update(&display_buffer)?;
    }

    Ok(())
}
