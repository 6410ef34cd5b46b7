//! Builds a small walled lot with a fence run and prints what was produced.
//!
//! ```text
//! cargo run --example square_lot
//! RUST_LOG=lotwalls=debug cargo run --example square_lot
//! ```

use std::collections::HashMap;

use lotwalls::assets::{AssetResolver, MaterialHandle, ModelHandle, NoRoofs};
use lotwalls::lot::{
    ElevationGrid, FenceCatalogEntry, FencePost, Layer, LayerTable, Node, PatternMap, Segment,
    WallGraph, NO_SURFACE,
};
use lotwalls::{BuildLotWalls, Result};

const PICKET_FENCE: u32 = 0x4c8f_2a10;

/// Resolves every material and model by name, and knows one fence style.
struct DemoAssets {
    handles: HashMap<String, u64>,
}

impl DemoAssets {
    fn new() -> Self {
        let handles = ["wall_top", "wall_brick_base", "wall_paint_base", "picket", "picket_post"]
            .iter()
            .zip(1..)
            .map(|(name, id)| ((*name).to_owned(), id))
            .collect();
        Self { handles }
    }
}

impl AssetResolver for DemoAssets {
    fn catalog_material(&self, _guid: u32) -> Option<String> {
        None
    }

    fn material(&self, name: &str) -> Option<MaterialHandle> {
        self.handles.get(name).copied().map(MaterialHandle)
    }

    fn fence(&self, guid: u32) -> Option<FenceCatalogEntry> {
        (guid == PICKET_FENCE).then(|| FenceCatalogEntry {
            rail: "picket".to_owned(),
            diagonal_rail: None,
            post: "picket_post".to_owned(),
        })
    }

    fn model(&self, name: &str) -> Option<ModelHandle> {
        self.handles.get(name).copied().map(ModelHandle)
    }
}

fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("lotwalls=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // A 6x4 room on the ground floor with a fence running east from it.
    let mut graph = WallGraph::new(0, 1);
    for (id, x, y) in [(1, 2.0, 2.0), (2, 8.0, 2.0), (3, 8.0, 6.0), (4, 2.0, 6.0), (5, 12.0, 2.0)] {
        graph.add_node(Node::new(id, x, y, 0));
    }
    for (from, to) in [(1, 2), (2, 3), (3, 4), (4, 1)] {
        graph.add_segment(Segment::new(from, to, 1));
    }
    graph.add_segment(Segment::new(2, 5, 2));

    let layers: LayerTable = [
        Layer::new(1, 1, 0, 1),
        Layer::new(2, PICKET_FENCE, NO_SURFACE, NO_SURFACE),
    ]
    .into_iter()
    .collect();
    let patterns: PatternMap = [(0, "brick"), (1, "paint")].into_iter().collect();

    // Ground slopes gently to the east.
    let (width, height) = (16_u32, 10_u32);
    let ground = (0..width)
        .flat_map(|x| (0..height).map(move |_| f64::from(x) * 0.05))
        .collect();
    let elevation = ElevationGrid::new(width as usize, height as usize, vec![ground])?;

    let posts = [FencePost {
        guid: PICKET_FENCE,
        x: 12.0,
        y: 2.0,
        level: 0,
    }];

    let lot = BuildLotWalls::new(&graph, &layers, &patterns, &elevation)
        .with_fence_posts(&posts)
        .execute(&DemoAssets::new(), &NoRoofs)?;

    for (id, committed) in &lot.meshes.patterns {
        println!(
            "pattern {id} ({}): {} vertices, {} triangles",
            committed.name,
            committed.mesh.vertex_count(),
            committed.mesh.triangle_count()
        );
    }
    println!(
        "thickness: {} triangles",
        lot.meshes.thickness.mesh.triangle_count()
    );
    for fence in lot.fences.iter() {
        println!("fence {:#x}: {} instances", fence.guid(), fence.len());
    }
    println!("{:?}", lot.stats);
    Ok(())
}
