use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Camera index (default 0)
    #[arg(short, long, default_value_t = 0)]
    pub device: u32,

    /// Requested capture width
    #[arg(long, default_value_t = 960)]
    pub width: u32,

    /// Requested capture height
    #[arg(long, default_value_t = 540)]
    pub height: u32,

    /// Maximum number of faces to track per frame
    #[arg(long, default_value_t = 1)]
    pub max_num_faces: usize,

    /// Face detector score threshold
    #[arg(long, default_value_t = 0.7)]
    pub min_detection_confidence: f32,

    /// Mirror the camera output
    #[arg(long)]
    pub mirror: bool,

    /// List available cameras
    #[arg(long)]
    pub list: bool,

    /// Print remapped iris points to the console every frame
    #[arg(long)]
    pub verbose: bool,
}
