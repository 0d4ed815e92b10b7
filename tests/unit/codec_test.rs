//! Unit tests for the image codec

use banner_studio::codec::{base64, raster};
use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma, Rgb, RgbImage};
use std::io::Cursor;

fn jpeg_bytes() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_fn(16, 16, |x, y| {
        Rgb([(x * 16) as u8, (y * 16) as u8, 200])
    }));
    let mut out = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Jpeg(90))
        .unwrap();
    out
}

#[test]
fn test_data_uri_preserves_png_bytes() {
    let images = [
        DynamicImage::ImageLuma8(GrayImage::from_fn(7, 2, |x, _| Luma([x as u8 * 30]))),
        DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([255, 0, 0]))),
        DynamicImage::ImageRgb8(RgbImage::from_fn(64, 32, |x, y| Rgb([x as u8, y as u8, 7]))),
    ];

    for image in images {
        let png = raster::encode_png(&image).unwrap();
        let uri = raster::encode_data_uri(&image).unwrap();

        assert_eq!(base64::media_type_of(&uri), Some("image/png"));
        assert_eq!(base64::decode(&uri).unwrap(), png);
    }
}

#[test]
fn test_jpeg_upload_is_reencoded_as_png() {
    let upload = raster::load_upload(&jpeg_bytes()).unwrap();
    let uri = raster::encode_data_uri(&upload).unwrap();
    let png = base64::decode(&uri).unwrap();

    assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (16, 16));
}

#[test]
fn test_gif_upload_is_rejected() {
    let gif = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;";
    assert!(raster::load_upload(gif).is_err());
}

#[test]
fn test_create_data_url() {
    let data = b"test data";
    let data_url = base64::create_data_url(data, "video/mp4");

    assert!(data_url.starts_with("data:video/mp4;base64,"));
    assert_eq!(base64::decode(&data_url).unwrap(), data.to_vec());
}
