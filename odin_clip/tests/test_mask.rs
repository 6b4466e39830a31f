/*
 * Copyright © 2026, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use geo::{LineString, Polygon};
use ndarray::Array3;
use odin_gdal::AffineTransform;
use odin_clip::{ClipError, ClipWindow, PixelBox, clip_array, rasterize_mask};
use odin_clip::lookup::bbox_polygon;

// run with "cargo test test_xx -- --nocapture"

/// 1x1 pixels with origin at (0,0) and y growing with row index
fn unit_transform()->AffineTransform {
    AffineTransform::new( 0.0, 1.0, 0.0, 0.0, 0.0, 1.0)
}

fn polygon (coords: Vec<(f64,f64)>)->Polygon<f64> {
    Polygon::new( LineString::from( coords), vec![])
}

#[test]
fn test_square_mask()->anyhow::Result<()> {
    let mask = rasterize_mask( &bbox_polygon( 10.0, 10.0, 30.0, 30.0), &unit_transform(), 100, 100)?;

    assert_eq!( mask.shape(), (100,100));
    assert_eq!( mask.included_count(), 400);
    assert!( !mask.is_excluded( 10, 10));
    assert!( !mask.is_excluded( 29, 29));
    assert!( mask.is_excluded( 9, 10));
    assert!( mask.is_excluded( 30, 29));

    let bbox = mask.bounding_box().unwrap();
    println!("{bbox:?}");
    assert_eq!( bbox, PixelBox { min_row: 10, max_row: 29, min_col: 10, max_col: 29 });
    assert_eq!( (bbox.height(), bbox.width()), (20,20));
    assert!( bbox.contains( 10, 29) && !bbox.contains( 30, 10));
    Ok(())
}

#[test]
fn test_edge_inclusive()->anyhow::Result<()> {
    // polygon edges run exactly through pixel centers
    let mask = rasterize_mask( &bbox_polygon( 10.5, 10.5, 12.5, 12.5), &unit_transform(), 20, 20)?;
    assert_eq!( mask.included_count(), 9);
    assert_eq!( mask.bounding_box(), Some( PixelBox { min_row: 10, max_row: 12, min_col: 10, max_col: 12 }));
    Ok(())
}

#[test]
fn test_triangle_mask()->anyhow::Result<()> {
    let triangle = polygon( vec![ (0.0,0.0), (10.0,0.0), (0.0,10.0), (0.0,0.0) ]);
    let mask = rasterize_mask( &triangle, &unit_transform(), 10, 10)?;

    for row in 0..10 {
        for col in 0..10 {
            assert_eq!( mask.is_excluded( row, col), row + col > 9, "pixel ({row},{col})");
        }
    }
    assert_eq!( mask.included_count(), 55);
    Ok(())
}

#[test]
fn test_north_up_mask()->anyhow::Result<()> {
    let transform = AffineTransform::north_up( 0.0, 1.0, 100.0, -1.0);
    let mask = rasterize_mask( &bbox_polygon( 10.0, 10.0, 30.0, 30.0), &transform, 100, 100)?;

    let bbox = mask.bounding_box().unwrap();
    assert_eq!( bbox, PixelBox { min_row: 70, max_row: 89, min_col: 10, max_col: 29 });
    Ok(())
}

#[test]
fn test_polygon_outside_grid()->anyhow::Result<()> {
    let mask = rasterize_mask( &bbox_polygon( 150.0, 150.0, 170.0, 170.0), &unit_transform(), 100, 100)?;
    assert!( mask.is_empty());
    assert!( mask.bounding_box().is_none());

    let data = Array3::<u8>::ones( (1, 100, 100));
    let res = clip_array( &data, &bbox_polygon( 150.0, 150.0, 170.0, 170.0), &unit_transform(), &[]);
    assert!( matches!( res, Err(ClipError::EmptyClipRegion)));
    Ok(())
}

#[test]
fn test_invalid_polygons() {
    let bowtie = polygon( vec![ (0.0,0.0), (10.0,10.0), (10.0,0.0), (0.0,10.0), (0.0,0.0) ]);
    let res = rasterize_mask( &bowtie, &unit_transform(), 20, 20);
    println!("bowtie: {res:?}");
    assert!( matches!( res, Err(ClipError::InvalidPolygon(_))));

    let degenerate = polygon( vec![ (0.0,0.0), (5.0,5.0) ]);
    assert!( matches!( rasterize_mask( &degenerate, &unit_transform(), 20, 20), Err(ClipError::InvalidPolygon(_))));

    let non_finite = polygon( vec![ (0.0,0.0), (f64::NAN,5.0), (5.0,0.0), (0.0,0.0) ]);
    assert!( matches!( rasterize_mask( &non_finite, &unit_transform(), 20, 20), Err(ClipError::InvalidPolygon(_))));
}

#[test]
fn test_clip_square()->anyhow::Result<()> {
    let data = Array3::<u16>::from_shape_fn( (2, 100, 100), |(b,r,c)| (1 + b * 10_000 + r * 100 + c) as u16);
    let (clipped, transform, bbox) = clip_array( &data, &bbox_polygon( 10.0, 10.0, 30.0, 30.0), &unit_transform(), &[])?;

    assert_eq!( clipped.dim(), (2, 20, 20));
    assert_eq!( bbox.min_row, 10);
    assert_eq!( transform.apply( 0.0, 0.0), (10.0, 10.0));
    assert_eq!( (transform.b, transform.c, transform.e, transform.f), (1.0, 0.0, 0.0, 1.0));
    assert_eq!( clipped[[0,0,0]], data[[0,10,10]]);
    assert_eq!( clipped[[1,19,19]], data[[1,29,29]]);
    assert!( clipped.iter().all( |v| *v != 0));
    Ok(())
}

#[test]
fn test_clip_fill_values()->anyhow::Result<()> {
    let data = Array3::<u8>::from_elem( (3, 10, 10), 7);
    let triangle = polygon( vec![ (0.0,0.0), (10.0,0.0), (0.0,10.0), (0.0,0.0) ]);
    // band 2 nodata is not representable as u8 and falls back to zero
    let nodata = vec![ None, Some(255.0), Some(-1.0) ];

    let (clipped, _, bbox) = clip_array( &data, &triangle, &unit_transform(), &nodata)?;
    assert_eq!( bbox, PixelBox { min_row: 0, max_row: 9, min_col: 0, max_col: 9 });

    for ((b,r,c), v) in clipped.indexed_iter() {
        let expected = if r + c <= 9 { 7 } else { [0, 255, 0][b] };
        assert_eq!( *v, expected, "pixel ({b},{r},{c})");
    }
    Ok(())
}

#[test]
fn test_partial_overlap_crop()->anyhow::Result<()> {
    // clipping itself does not require containment, it crops to the covered part of the grid
    let data = Array3::<f32>::from_elem( (1, 50, 50), 1.5);
    let (clipped, transform, _) = clip_array( &data, &bbox_polygon( 40.0, -10.0, 60.0, 5.0), &unit_transform(), &[ Some(-9999.0) ])?;

    assert_eq!( clipped.dim(), (1, 5, 10));
    assert_eq!( transform.apply( 0.0, 0.0), (40.0, 0.0));
    assert!( clipped.iter().all( |v| *v == 1.5));
    Ok(())
}

#[test]
fn test_clip_window()->anyhow::Result<()> {
    let triangle = polygon( vec![ (2.0,2.0), (12.0,2.0), (2.0,12.0), (2.0,2.0) ]);
    let transform = unit_transform();
    let window = ClipWindow::new( &triangle, &transform, 20, 20)?;

    assert_eq!( window.pixel_box, PixelBox { min_row: 2, max_row: 11, min_col: 2, max_col: 11 });
    assert_eq!( window.mask.shape(), (10,10));
    assert_eq!( window.included, 55);
    assert_eq!( window.transform( &transform).apply( 0.0, 0.0), (2.0, 2.0));

    let data = Array3::<i16>::from_elem( (2, 20, 20), -3);
    let (clipped, clip_transform, bbox) = clip_array( &data, &triangle, &transform, &[ Some(-32768.0) ])?;
    assert_eq!( bbox, window.pixel_box);
    assert_eq!( clip_transform, window.transform( &transform));
    assert_eq!( clipped, window.apply( Array3::from_elem( (2, 10, 10), -3i16), &[ Some(-32768.0) ]));
    assert_eq!( clipped[[0,9,9]], -32768);
    assert_eq!( clipped[[1,9,9]], 0);
    Ok(())
}
