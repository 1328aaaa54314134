// this_file: crates/penna/tests/integration_test.rs

//! End-to-end pipeline tests: face → shape → layout → run building →
//! analytic filling, over the deterministic test font.

use penna::{
    Alignment, Context, EdgeBuilder, Face, Filler, FillRule, FontSource, GlyphInstance, Layout,
    LayoutOptions, Point, RunBuilder, Transform, WrapMode,
};
use penna_font::testing::FixedFont;
use std::sync::Arc;

fn face_at(size: f32) -> Face {
    Face::source(FontSource::from_parsed(Arc::new(FixedFont::new())), size)
}

fn layout_text(text: &str, max_width: f32) -> Layout {
    let ctx = Context::new();
    let options = LayoutOptions {
        max_width,
        wrap: WrapMode::Word,
        ..Default::default()
    };
    ctx.layout(text, &face_at(16.0), &options)
}

#[test]
fn shape_layout_consistency() {
    let layout = layout_text("hello world", 0.0);
    assert_eq!(layout.lines.len(), 1);
    // 11 scalars at half an em each.
    assert_eq!(layout.glyph_count(), 11);
    assert_eq!(layout.lines[0].width, 11.0 * 8.0);
}

#[test]
fn wrapped_layout_glyphs_are_conserved() {
    let text = "aa bb cc dd ee";
    let layout = layout_text(text, 40.0);
    assert!(layout.lines.len() > 1);
    let scalars = text.chars().count();
    assert_eq!(layout.glyph_count(), scalars);
}

#[test]
fn draw_commands_from_layout() {
    let ctx = Context::new();
    let face = face_at(16.0);
    let layout = ctx.layout("ab", &face, &LayoutOptions::default());

    let source = face.source_ref().cloned().unwrap();
    let mut builder = RunBuilder::new();
    for line in &layout.lines {
        for g in &line.glyphs {
            builder.push(GlyphInstance {
                font_id: source.id(),
                glyph_id: g.id,
                position: Point::new(g.x, line.y),
                size: 16.0,
            });
        }
    }

    let cache = penna::OutlineCache::new(256);
    let commands = builder.build(&cache, |instance| {
        source
            .font()
            .outline(instance.glyph_id, instance.size)
            .ok()
            .flatten()
            .map(Arc::new)
    });
    assert_eq!(commands.len(), 2);
    // Both letters share the glyph box outline but land at different pens.
    assert!(commands[0].transform.tx < commands[1].transform.tx);
}

#[test]
fn rasterized_glyph_produces_coverage() {
    let ctx = Context::new();
    let face = face_at(16.0);
    let layout = ctx.layout("a", &face, &LayoutOptions::default());
    let source = face.source_ref().cloned().unwrap();

    let mut builder = RunBuilder::new();
    let line = &layout.lines[0];
    builder.push(GlyphInstance {
        font_id: source.id(),
        glyph_id: line.glyphs[0].id,
        position: Point::new(line.glyphs[0].x, line.y),
        size: 16.0,
    });
    let cache = penna::OutlineCache::new(64);
    let commands = builder.build(&cache, |instance| {
        source
            .font()
            .outline(instance.glyph_id, instance.size)
            .ok()
            .flatten()
            .map(Arc::new)
    });
    assert_eq!(commands.len(), 1);

    // The glyph box is 8 x 11.2 px in Y-up space; after the Y-flip and
    // baseline placement it spans rows above the baseline.
    let mut edges = EdgeBuilder::new();
    edges.append_outline(&commands[0].outline, &commands[0].transform);
    let edges = edges.finish();

    let mut filler = Filler::new(32);
    let mut covered_rows = 0;
    let mut max_alpha = 0u8;
    filler.fill(&edges, FillRule::NonZero, |_, runs| {
        covered_rows += 1;
        for run in runs {
            max_alpha = max_alpha.max(run.alpha);
        }
        true
    });
    assert!(covered_rows >= 11);
    assert_eq!(max_alpha, 255);
}

#[test]
fn spaces_draw_nothing_but_advance() {
    let ctx = Context::new();
    let face = face_at(16.0);
    let run = ctx.shape("a b", &face);
    assert_eq!(run.glyphs.len(), 3);

    let source = face.source_ref().cloned().unwrap();
    let mut builder = RunBuilder::new();
    for g in run.glyphs.iter() {
        builder.push(GlyphInstance {
            font_id: source.id(),
            glyph_id: g.id,
            position: Point::new(g.x, 0.0),
            size: 16.0,
        });
    }
    let cache = penna::OutlineCache::new(64);
    let commands = builder.build(&cache, |instance| {
        source
            .font()
            .outline(instance.glyph_id, instance.size)
            .ok()
            .flatten()
            .map(Arc::new)
    });
    // The space resolves to an empty outline and is omitted.
    assert_eq!(commands.len(), 2);
}

#[test]
fn centered_layout_is_symmetric() {
    let ctx = Context::new();
    let options = LayoutOptions {
        max_width: 100.0,
        alignment: Alignment::Center,
        ..Default::default()
    };
    let layout = ctx.layout("abcd", &face_at(16.0), &options);
    let line = &layout.lines[0];
    let left = line.glyphs.first().map(|g| g.x).unwrap();
    let right = line.glyphs.last().map(|g| g.x + g.x_advance).unwrap();
    assert!((left - (100.0 - right)).abs() < 1e-4);
}

#[test]
fn subpixel_cache_workflow() {
    let ctx = Context::new();
    let face = face_at(16.0);
    let source = face.source_ref().cloned().unwrap();
    let key = penna::OutlineCacheKey::for_size(source.id(), 97, 16.0, penna::Hinting::None);

    // Fractional positions in the same quantization slot share an entry.
    let first = ctx.outlines().get_or_create(key, Point::new(5.30, 2.0), |dx, _| {
        assert!(dx > 0.0);
        source.font().outline(97, 16.0).ok().flatten().map(Arc::new)
    });
    assert!(first.is_some());

    let second = ctx
        .outlines()
        .get_or_create(key, Point::new(5.49, 2.0), |_, _| None);
    assert!(second.is_some());
    assert_eq!(ctx.outlines().len(), 1);

    // Closing the source purges every sub-pixel variant.
    ctx.close_source(&source);
    assert_eq!(ctx.outlines().len(), 0);
}

#[test]
fn transform_flip_lands_glyphs_on_screen_rows() {
    // A glyph box extends upward from the baseline in font space; after
    // the builder's Y-flip its screen rows are above (numerically less
    // than) the baseline row.
    let source = FontSource::from_parsed(Arc::new(FixedFont::new()));
    let outline = source.font().outline(97, 16.0).ok().flatten().map(Arc::new).unwrap();

    let baseline = 20.0f32;
    let transform = Transform::IDENTITY
        .mul(&Transform::translate(0.0, baseline))
        .mul(&Transform::scale(1.0, -1.0));

    let top = transform.apply(Point::new(0.0, outline.bounds.y_max));
    let bottom = transform.apply(Point::new(0.0, outline.bounds.y_min));
    assert!(top.y < bottom.y);
    assert!((bottom.y - baseline).abs() < 1e-5);
}
