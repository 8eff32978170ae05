//! Brick Tower demo host
//!
//! Grows a tower over a few simulated days and reports the draw calls the
//! host renderer would issue.
//!
//! Usage: `brick-tower [small|medium|large|<settings.json>] [days]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use brick_tower::renderer::{InstancedRenderer, submit_batches};
    use brick_tower::tower::total_instances;
    use brick_tower::{Tower, TowerError, TowerPreset, TowerSettings};
    use glam::Mat4;

    /// Bricks earned per simulated day
    const DAILY_BRICKS: [usize; 7] = [120, 340, 95, 610, 1500, 20, 875];

    /// Renderer stand-in that only counts what it is asked to draw
    #[derive(Default)]
    struct CountingRenderer {
        draw_calls: usize,
        instances: usize,
    }

    impl InstancedRenderer for CountingRenderer {
        type Mesh = ();
        type Material = ();

        fn draw_mesh_instanced(&mut self, _: &(), _: &(), transforms: &[Mat4], count: usize) {
            debug_assert_eq!(transforms.len(), count);
            self.draw_calls += 1;
            self.instances += count;
        }
    }

    fn load_settings(arg: Option<&str>) -> Result<TowerSettings, TowerError> {
        match arg {
            None => Ok(TowerSettings::default()),
            Some(name) => match TowerPreset::from_str(name) {
                Some(preset) => {
                    log::info!("Using {} preset", preset.as_str());
                    Ok(TowerSettings::from_preset(preset))
                }
                None => TowerSettings::load(name),
            },
        }
    }

    fn run() -> Result<(), TowerError> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let settings = load_settings(args.first().map(String::as_str))?;
        let days = args
            .get(1)
            .and_then(|d| d.parse::<usize>().ok())
            .unwrap_or(DAILY_BRICKS.len());

        let mut tower = Tower::new(&settings)?;
        log::info!(
            "Tower initialized with seed: {} ({} bricks per level, radius {})",
            tower.parameters().seed(),
            tower.parameters().bricks_per_level(),
            tower.parameters().radius()
        );

        for day in 0..days {
            let earned = DAILY_BRICKS[day % DAILY_BRICKS.len()];
            tower.add_bricks(earned);

            let placed = tower.take_placed_bricks();
            let batches = tower.batches().to_vec();
            let mut renderer = CountingRenderer::default();
            submit_batches(&mut renderer, &(), &(), &batches);

            let params = tower.parameters().shape();
            log::info!(
                "Day {}: +{} bricks ({} placed), total {}, {} levels, top {:.2}, {} draw calls",
                day + 1,
                earned,
                placed.len(),
                total_instances(&batches),
                params.height,
                tower.top_height(),
                renderer.draw_calls
            );
            debug_assert_eq!(renderer.instances, params.total_bricks);
        }

        Ok(())
    }

    pub fn main() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        log::info!("Brick Tower (native) starting...");

        if let Err(e) = run() {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::main();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the web host; nothing to run here
}
