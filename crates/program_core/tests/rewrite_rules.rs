use program_core::{export_base_path, AssetPathSet, ElementKind, PathStripper, ReferenceRewriter};

const BASE: &str = "/archive/acme2024/";

fn rewriter() -> ReferenceRewriter {
    ReferenceRewriter::new("acme2024", BASE)
}

#[test]
fn stripping_removes_locale_conference_and_query() {
    let stripper = PathStripper::new("acme2024");

    assert_eq!(stripper.strip("/en/acme2024/public/schedule/3"), "schedule/3");
    assert_eq!(stripper.strip("/acme2024/public/images/logo.png?12345"), "images/logo.png");
    assert_eq!(stripper.strip("/assets/application.js?body=1"), "assets/application.js");
    assert_eq!(stripper.strip("/de/acme2024/public/events"), "events");
}

#[test]
fn stripping_is_idempotent() {
    let stripper = PathStripper::new("acme2024");
    let samples = [
        "/en/acme2024/public/schedule/3",
        "/acme2024/public/images/logo.png?12345",
        "/assets/application.css?body=1",
        "/other/acme2024/public/x",
        "images/logo.png",
        "/acme2024/public/acme2024/public/x",
        "/en/acme2024/public/en/acme2024/public/x",
        "",
    ];

    for sample in samples {
        let once = stripper.strip(sample);
        assert_eq!(stripper.strip(once), once, "sample {sample:?}");
    }
}

#[test]
fn anchor_to_page_gets_html_suffix() {
    let mut assets = AssetPathSet::new();

    let rewritten = rewriter().rewrite(
        ElementKind::Anchor,
        "/en/acme2024/public/schedule/3",
        &mut assets,
    );

    assert_eq!(rewritten.as_deref(), Some("/archive/acme2024/schedule/3.html"));
    assert!(assets.is_empty());
}

#[test]
fn anchor_with_extension_keeps_it() {
    let mut assets = AssetPathSet::new();

    let rewritten = rewriter().rewrite(
        ElementKind::Anchor,
        "/acme2024/public/speakers.json",
        &mut assets,
    );

    assert_eq!(rewritten.as_deref(), Some("/archive/acme2024/speakers.json"));
}

#[test]
fn anchor_with_numeric_query_is_an_asset() {
    let mut assets = AssetPathSet::new();

    let rewritten = rewriter().rewrite(
        ElementKind::Anchor,
        "/system/attachments/5/original/slides.pdf?1400000000",
        &mut assets,
    );

    assert_eq!(
        rewritten.as_deref(),
        Some("/archive/acme2024/system/attachments/5/original/slides.pdf")
    );
    assert!(assets.contains("system/attachments/5/original/slides.pdf"));
}

#[test]
fn anchor_fragment_is_preserved() {
    let mut assets = AssetPathSet::new();

    let rewritten = rewriter().rewrite(
        ElementKind::Anchor,
        "/acme2024/public/schedule/1#hall-a",
        &mut assets,
    );

    assert_eq!(
        rewritten.as_deref(),
        Some("/archive/acme2024/schedule/1.html#hall-a")
    );
}

#[test]
fn relative_and_external_anchors_are_untouched() {
    let mut assets = AssetPathSet::new();
    let rewriter = rewriter();

    for href in ["speakers/2", "https://example.com/", "//example.com/x", "#top", "mailto:a@b.c"] {
        assert_eq!(rewriter.rewrite(ElementKind::Anchor, href, &mut assets), None, "{href}");
    }
    assert!(assets.is_empty());
}

#[test]
fn image_asset_is_recorded_without_query() {
    let mut assets = AssetPathSet::new();

    let rewritten = rewriter().rewrite(
        ElementKind::Image,
        "/acme2024/public/images/logo.png?12345",
        &mut assets,
    );

    assert_eq!(rewritten.as_deref(), Some("/archive/acme2024/images/logo.png"));
    assert_eq!(assets.iter().collect::<Vec<_>>(), vec!["images/logo.png"]);
}

#[test]
fn non_numeric_query_is_dropped_from_assets() {
    let mut assets = AssetPathSet::new();
    let rewriter = rewriter();

    let script = rewriter.rewrite(
        ElementKind::Script,
        "/acme2024/public/app.js?v=abc",
        &mut assets,
    );
    let image = rewriter.rewrite(ElementKind::Image, "/images/a.png?size=2&x=1", &mut assets);

    assert_eq!(script.as_deref(), Some("/archive/acme2024/app.js"));
    assert_eq!(image.as_deref(), Some("/archive/acme2024/images/a.png"));
    assert_eq!(assets.iter().collect::<Vec<_>>(), vec!["app.js", "images/a.png"]);
}

#[test]
fn program_stylesheet_maps_to_exported_style() {
    let mut assets = AssetPathSet::new();
    let rewriter = rewriter();

    for href in [
        "/acme2024/public/schedule/style.css",
        "/en/acme2024/public/schedule/style.css?99",
    ] {
        assert_eq!(
            rewriter.rewrite(ElementKind::Link, href, &mut assets).as_deref(),
            Some("/archive/acme2024/style.css")
        );
    }
    assert!(assets.is_empty());
}

#[test]
fn other_stylesheets_are_assets() {
    let mut assets = AssetPathSet::new();

    let rewritten = rewriter().rewrite(
        ElementKind::Link,
        "/assets/public_schedule.css?body=1",
        &mut assets,
    );

    assert_eq!(
        rewritten.as_deref(),
        Some("/archive/acme2024/assets/public_schedule.css")
    );
    assert!(assets.contains("assets/public_schedule.css"));
}

#[test]
fn external_scripts_are_untouched() {
    let mut assets = AssetPathSet::new();

    let rewritten = rewriter().rewrite(
        ElementKind::Script,
        "https://cdn.example.com/jquery.js",
        &mut assets,
    );

    assert_eq!(rewritten, None);
    assert!(assets.is_empty());
}

#[test]
fn asset_set_deduplicates() {
    let mut assets = AssetPathSet::new();
    let rewriter = rewriter();

    rewriter.rewrite(ElementKind::Image, "/images/a.png?1", &mut assets);
    rewriter.rewrite(ElementKind::Image, "/images/a.png?2", &mut assets);
    rewriter.rewrite(ElementKind::Script, "/images/a.png", &mut assets);

    assert_eq!(assets.len(), 1);
}

#[test]
fn base_path_is_normalized() {
    assert_eq!(export_base_path(None).unwrap(), "/");
    assert_eq!(
        export_base_path(Some("https://static.example.org/archive/acme2024")).unwrap(),
        "/archive/acme2024/"
    );
    assert_eq!(
        export_base_path(Some("https://static.example.org/archive/")).unwrap(),
        "/archive/"
    );
    assert_eq!(export_base_path(Some("/program")).unwrap(), "/program/");
}
