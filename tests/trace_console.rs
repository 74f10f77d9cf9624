use autotyper::surface::EditableSurface;
use autotyper::trace::ConsoleSurface;

#[test]
fn appends_only_the_new_suffix() {
    let mut surface = ConsoleSurface::new(Vec::new());
    surface.write_text("h").expect("write");
    surface.write_text("hi").expect("write");

    assert_eq!(surface.text(), "hi");
    let out = String::from_utf8(surface.into_inner()).expect("utf8 output");
    assert_eq!(out, "hi");
}

#[test]
fn erases_removed_characters_with_backspaces() {
    let mut surface = ConsoleSurface::new(Vec::new());
    surface.write_text("hX").expect("write");
    surface.write_text("h").expect("write");
    surface.write_text("hi").expect("write");

    let out = String::from_utf8(surface.into_inner()).expect("utf8 output");
    assert_eq!(out, "hX\u{8} \u{8}i");
}

#[test]
fn rewrites_from_the_divergence_point() {
    let mut surface = ConsoleSurface::new(Vec::new());
    surface.write_text("abc").expect("write");
    surface.write_text("abX").expect("write");

    let out = String::from_utf8(surface.into_inner()).expect("utf8 output");
    assert_eq!(out, "abc\u{8} \u{8}X");
}

#[test]
fn reads_back_what_was_written() {
    let mut surface = ConsoleSurface::new(Vec::new());
    surface.write_text("line one\nline two").expect("write");

    assert_eq!(
        surface.read_current_text().expect("read"),
        "line one\nline two"
    );
    assert!(surface.is_multi_line());
}
