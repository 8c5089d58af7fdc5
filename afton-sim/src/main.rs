use std::{fs::File, io::BufWriter, path::PathBuf};

use afton::{
    game::{Game, Phase},
    level::LevelConfig,
    resources,
    simulator::SimulatedBus,
};
use anyhow::Context;
use clap::{Parser, ValueEnum};

mod render;
mod script;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scene {
    Collide,
    Cutscene,
}

impl Scene {
    fn level(self) -> &'static LevelConfig {
        match self {
            Scene::Collide => &resources::COLLIDE,
            Scene::Cutscene => &resources::CUTSCENE,
        }
    }
}

#[derive(Parser)]
struct CliArguments {
    #[arg(long, value_enum, default_value_t = Scene::Cutscene)]
    scene: Scene,
    /// Stop after this many frames even if the game is still going
    #[arg(long)]
    frames: usize,
    /// Buttons to hold, for example `R*100,RA*4,-*30`
    #[arg(long, default_value = "")]
    input: String,
    /// Where to save a PNG of the last frame
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = CliArguments::parse();
    let script = script::parse(&args.input)?;

    let mut bus = SimulatedBus::new();
    let mut game = Game::new(&mut bus, args.scene.level())?;

    let mut ran = 0;
    for buttons in script::frames(&script).take(args.frames) {
        bus.set_keys(buttons);
        ran += 1;

        if game.step(&mut bus) == Phase::Halted {
            break;
        }
    }

    log::info!(
        "Stopped after {ran} frames in {:?} with the camera at {}",
        game.phase(),
        game.camera()
    );
    if bus.video_writes_outside_vblank() != 0 {
        log::warn!(
            "{} video writes happened outside the vertical blank",
            bus.video_writes_outside_vblank()
        );
    }

    if let Some(path) = args.output {
        let image = render::Screen::capture(&bus).to_image();

        let mut output = BufWriter::new(
            File::options()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)
                .with_context(|| format!("cannot open {}", path.display()))?,
        );
        image.write_to(&mut output, image::ImageOutputFormat::Png)?;
    }

    Ok(())
}
