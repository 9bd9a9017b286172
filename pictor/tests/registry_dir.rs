//! Registry behavior over an on-disk codecs directory.

use pictor::Registry;
use pictor_common::ErrorCode;
use std::fs;

fn write_manifest(dir: &std::path::Path, file: &str, text: &str) {
    fs::write(dir.join(file), text).unwrap();
}

#[test]
fn test_duplicate_extension_first_wins() {
    // Two codecs claim the "img" extension; the first registration wins
    // and resolution is stable across calls.
    let dir = tempfile::tempdir().unwrap();
    write_manifest(
        dir.path(),
        "a-first.codec",
        "layout=4\nname=first\nextensions=img\n",
    );
    write_manifest(
        dir.path(),
        "b-second.codec",
        "layout=4\nname=second\nextensions=img\n",
    );

    let registry = Registry::with_directory(dir.path());

    let id = registry.codec_for_extension("img").unwrap();
    assert_eq!(registry.info(id).name, "first");

    for _ in 0..3 {
        assert_eq!(registry.codec_for_extension("img").unwrap(), id);
    }
}

#[test]
fn test_builtin_codecs_precede_directory_claims() {
    let dir = tempfile::tempdir().unwrap();
    write_manifest(
        dir.path(),
        "usurper.codec",
        "layout=4\nname=usurper\nextensions=gif\n",
    );

    let registry = Registry::with_directory(dir.path());
    let id = registry.codec_for_extension("gif").unwrap();
    assert_eq!(registry.info(id).name, "gif");
}

#[test]
fn test_broken_manifest_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_manifest(dir.path(), "broken.codec", "name=no-layout-here\n");
    write_manifest(
        dir.path(),
        "fine.codec",
        "layout=4\nname=fine\nextensions=fin\n",
    );

    let registry = Registry::with_directory(dir.path());
    assert!(registry.codec_for_extension("fin").is_ok());
    assert!(registry
        .codecs()
        .all(|id| registry.info(id).name != "no-layout-here"));
}

#[test]
fn test_unsupported_layout_refused_at_bind_time() {
    let dir = tempfile::tempdir().unwrap();
    write_manifest(
        dir.path(),
        "legacy.codec",
        "layout=9\nname=legacy\nextensions=leg\n",
    );

    let registry = Registry::with_directory(dir.path());

    // Resolution works at the descriptor level...
    let id = registry.codec_for_extension("leg").unwrap();
    assert_eq!(registry.info(id).layout, 9);

    // ...but binding refuses the layout without calling anything.
    let err = registry.load_codec(id).unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnsupportedCodecLayout);
}

#[test]
fn test_manifest_without_implementation_fails_at_load() {
    let dir = tempfile::tempdir().unwrap();
    write_manifest(
        dir.path(),
        "phantom.codec",
        "layout=4\nname=phantom\nextensions=phm\n",
    );

    let registry = Registry::with_directory(dir.path());
    let id = registry.codec_for_extension("phm").unwrap();

    let err = registry.load_codec(id).unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoSuitableCodec);
}

#[test]
fn test_non_codec_files_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    write_manifest(dir.path(), "README.txt", "not a manifest");
    write_manifest(
        dir.path(),
        "real.codec",
        "layout=4\nname=real\nextensions=rea\n",
    );

    let registry = Registry::with_directory(dir.path());
    let builtin_count = Registry::builtin().len();
    assert_eq!(registry.len(), builtin_count + 1);
}

#[test]
fn test_mime_resolution_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_manifest(
        dir.path(),
        "m.codec",
        "layout=4\nname=mimed\nmime-types=image/x-mimed\n",
    );

    let registry = Registry::with_directory(dir.path());
    let id = registry.codec_for_mime("IMAGE/X-MIMED").unwrap();
    assert_eq!(registry.info(id).name, "mimed");
}
