//! Host-level flow: settings file -> tower -> draw calls

use brick_tower::renderer::{InstancedRenderer, submit_batches};
use brick_tower::tower::total_instances;
use brick_tower::{Tower, TowerError, TowerSettings};
use glam::Mat4;

#[derive(Default)]
struct CountingRenderer {
    calls: Vec<usize>,
}

impl InstancedRenderer for CountingRenderer {
    type Mesh = ();
    type Material = ();

    fn draw_mesh_instanced(&mut self, _: &(), _: &(), transforms: &[Mat4], count: usize) {
        assert_eq!(transforms.len(), count);
        self.calls.push(count);
    }
}

#[test]
fn test_settings_file_to_draw_calls() {
    let path = std::env::temp_dir().join(format!("brick_tower_{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{ "radius": 4.0, "bricks_per_level": 300, "total_bricks": 1100, "seed": 42 }"#,
    )
    .unwrap();
    let settings = TowerSettings::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let mut tower = Tower::new(&settings).unwrap();
    assert_eq!(tower.parameters().height(), 4);
    assert_eq!(tower.parameters().seed(), 42);

    let batches = tower.batches().to_vec();
    let mut renderer = CountingRenderer::default();
    assert_eq!(submit_batches(&mut renderer, &(), &(), &batches), 2);
    assert_eq!(renderer.calls, vec![1023, 77]);
}

#[test]
fn test_missing_settings_file() {
    let err = TowerSettings::load("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, TowerError::Io(_)));
}

#[test]
fn test_daily_growth_is_reproducible() {
    let settings = TowerSettings {
        seed: 2024,
        ..Default::default()
    };
    let mut a = Tower::new(&settings).unwrap();
    let mut b = Tower::new(&settings).unwrap();

    for earned in [5, 17, 3, 40] {
        a.add_bricks(earned);
        b.add_bricks(earned);
        let placed_a = a.take_placed_bricks();
        let placed_b = b.take_placed_bricks();
        assert_eq!(placed_a.len(), earned);
        assert_eq!(placed_a, placed_b);
    }
    assert_eq!(total_instances(a.batches()), 65);
    assert_eq!(a.top_height(), b.top_height());
}
