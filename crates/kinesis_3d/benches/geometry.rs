use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kinesis_3d::grid::{GeometryEmitter, GridModel, GridSize, ModelGeometry};
use kinesis_3d::polygon::{PolygonFrame, PolygonSet, TessellationShape};
use kinesis_3d::{GeometryBatch, PaintClip};
use kinesis_core::{Rect, Size};

const SCREEN: Size = Size::new(1920.0, 1080.0);

fn window() -> Rect {
    Rect::new(200.0, 150.0, 800.0, 600.0)
}

fn damage_clips() -> Vec<PaintClip> {
    let texture = PaintClip::whole_window(window()).texture_matrix;
    (0..8)
        .map(|i| PaintClip::new(Rect::new(200.0, 150.0 + i as f32 * 75.0, 800.0, 75.0), texture))
        .collect()
}

fn bench_tessellate(c: &mut Criterion) {
    c.bench_function("tessellate_hex_12x12", |b| {
        let mut set = PolygonSet::new();
        let mut shift = 0.0;
        b.iter(|| {
            // an unchanged rect would skip the rebuild
            shift = 1.0 - shift;
            let w = window();
            set.tessellate(
                black_box(Rect::new(w.x() + shift, w.y(), w.width(), w.height())),
                12,
                12,
                40.0,
                TessellationShape::Hexagonal,
                SCREEN.width,
            )
        })
    });
}

fn bench_polygon_frame(c: &mut Criterion) {
    let clips = damage_clips();
    let mut set = PolygonSet::new();
    let _ = set.tessellate(window(), 12, 12, 40.0, TessellationShape::Rectangular, SCREEN.width);
    let mut frame = PolygonFrame::new();

    // steady state: the clip sequence repeats every frame
    c.bench_function("polygon_frame_repeated_clips", |b| {
        b.iter(|| {
            set.begin_frame();
            for clip in &clips {
                let _ = set.store_clip(clip);
            }
            let _ = set.draw(black_box(0.5), 1.0, SCREEN, &mut frame);
        })
    });
}

fn bench_grid_emit(c: &mut Criterion) {
    let clips = damage_clips();
    let model = match GridModel::new(GridSize::new(4, 100), ModelGeometry::new(window()), false) {
        Ok(model) => model,
        Err(err) => panic!("grid model: {}", err),
    };
    let mut emitter = GeometryEmitter::new();
    let mut batch = GeometryBatch::new();

    c.bench_function("grid_emit_4x100", |b| {
        b.iter(|| emitter.emit(black_box(&model), &clips, true, &mut batch))
    });
}

criterion_group!(benches, bench_tessellate, bench_polygon_frame, bench_grid_emit);
criterion_main!(benches);
