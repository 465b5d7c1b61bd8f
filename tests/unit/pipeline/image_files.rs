use super::*;
use crate::foundation::error::TracemarkError;
use crate::text::renderer::BlockTextRenderer;
use image::{Rgb, RgbImage};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn write_cover(dir: &Path) -> PathBuf {
    let path = dir.join("cover.png");
    let cover = RgbImage::from_fn(48, 32, |x, y| Rgb([(x * 5) as u8, (y * 7) as u8, 90]));
    cover.save(&path).unwrap();
    path
}

#[test]
fn marked_copies_extract_to_their_secret() {
    let dir = tempfile::tempdir().unwrap();
    let cover = write_cover(dir.path());
    let out_dir = dir.path().join("out");
    let files = mark_image_file(
        &cover,
        &out_dir,
        2,
        6,
        &mut BlockTextRenderer,
        &mut ChaCha8Rng::seed_from_u64(4),
    )
    .unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[1].marked, out_dir.join("marked_1.png"));

    for f in &files {
        let secret = load_image(&f.secret).unwrap();
        let extracted_path = dir.path().join("extract.png");
        let (w, h) = extract_image_file(&f.marked, &extracted_path).unwrap();
        let extracted = load_image(&extracted_path).unwrap();
        assert_eq!(extracted.dimensions(), (w, h));
        for (x, y, px) in extracted.enumerate_pixels() {
            let s = secret.get_pixel(x, y);
            if !bitplane::is_blank(s) {
                assert_eq!(px.0, s.0.map(|c| c & 0xF0));
            }
        }
    }
}

#[test]
fn explicit_secret_merge() {
    let dir = tempfile::tempdir().unwrap();
    // Low nibbles of zero keep the cover itself invisible to extraction.
    let cover = dir.path().join("flat.png");
    RgbImage::from_pixel(48, 32, Rgb([0x80, 0x40, 0x20]))
        .save(&cover)
        .unwrap();
    let secret_path = dir.path().join("secret.png");
    let mut secret = RgbImage::new(4, 4);
    secret.put_pixel(3, 2, Rgb([200, 100, 50]));
    secret.save(&secret_path).unwrap();

    let out = dir.path().join("marked.png");
    merge_image_files(&cover, &secret_path, &out).unwrap();
    let extracted = dir.path().join("extract.png");
    assert_eq!(extract_image_file(&out, &extracted).unwrap(), (4, 3));

    let too_big = dir.path().join("big.png");
    RgbImage::new(64, 64).save(&too_big).unwrap();
    assert!(matches!(
        merge_image_files(&cover, &too_big, &out),
        Err(TracemarkError::Size { .. })
    ));
}
