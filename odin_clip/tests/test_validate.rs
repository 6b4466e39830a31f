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

use std::{borrow::Cow, path::PathBuf};
use geo::{LineString, Polygon};
use odin_gdal::{AffineTransform, Crs, GdalDataType, RasterMeta, reproject_polygon};
use odin_gdal::errors::OdinGdalError;
use odin_clip::{ClipError, check_aoi, check_containment, validate_aoi};
use odin_clip::lookup::bbox_polygon;
use odin_clip::validate::is_contained;

// run with "cargo test test_xx -- --nocapture"

/// a 100x100 grid of 30m pixels in UTM zone 50N
fn utm_meta()->anyhow::Result<RasterMeta> {
    Ok( RasterMeta {
        path: PathBuf::from("virtual.tif"),
        width: 100,
        height: 100,
        band_count: 1,
        transform: AffineTransform::north_up( 400_000.0, 30.0, 3_400_000.0, -30.0),
        crs: Crs::normalize("EPSG:32650")?,
        element_type: GdalDataType::UInt8,
        nodata: vec![None]
    })
}

#[test]
fn test_containment() -> anyhow::Result<()> {
    let bounds = bbox_polygon( 0.0, 0.0, 100.0, 100.0);

    assert!( check_containment( &bbox_polygon( 10.0, 10.0, 30.0, 30.0), &bounds)?);
    assert!( check_containment( &bounds, &bounds)?, "equal polygons are contained");
    assert!( check_containment( &bbox_polygon( 0.0, 10.0, 30.0, 30.0), &bounds)?, "touching from inside is contained");

    // same footprint, different vertex order
    let reordered = Polygon::new( LineString::from( vec![ (0.0,0.0), (100.0,0.0), (100.0,100.0), (0.0,100.0), (0.0,0.0) ]), vec![]);
    assert!( check_containment( &reordered, &bounds)?);

    assert!( !check_containment( &bbox_polygon( 90.0, 90.0, 110.0, 110.0), &bounds)?, "straddling");
    assert!( !check_containment( &bbox_polygon( 150.0, 150.0, 170.0, 170.0), &bounds)?, "disjoint");
    assert!( !check_containment( &bbox_polygon( -10.0, -10.0, 110.0, 110.0), &bounds)?, "covering");
    Ok(())
}

#[test]
fn test_containment_failure() {
    let bounds = bbox_polygon( 0.0, 0.0, 100.0, 100.0);
    let broken = bbox_polygon( 10.0, f64::NAN, 30.0, 30.0);

    let res = check_containment( &broken, &bounds);
    println!("{res:?}");
    assert!( matches!( res, Err(ClipError::BoundaryValidation(_))));
    assert!( !is_contained( &broken, &bounds));
}

#[test]
fn test_check_aoi_same_crs() -> anyhow::Result<()> {
    let meta = utm_meta()?;
    let aoi = bbox_polygon( 400_300.0, 3_397_300.0, 400_900.0, 3_397_900.0);

    let checked = check_aoi( &aoi, "epsg:32650", &meta)?;
    assert!( matches!( checked, Cow::Borrowed(_)));
    assert!( std::ptr::eq( checked.as_ref(), &aoi));

    let straddling = bbox_polygon( 402_000.0, 3_397_300.0, 403_500.0, 3_397_900.0);
    let res = check_aoi( &straddling, "EPSG:32650", &meta);
    assert!( matches!( res, Err(ClipError::NotContained)));
    assert!( validate_aoi( &straddling, "EPSG:32650", &meta).is_none());
    Ok(())
}

#[test]
fn test_check_aoi_reprojected() -> anyhow::Result<()> {
    let meta = utm_meta()?;
    // boxes well inside of and north of the grid, converted to geographic coordinates
    let inside = reproject_polygon( &bbox_polygon( 401_000.0, 3_398_000.0, 402_000.0, 3_399_000.0), "EPSG:32650", "EPSG:4326")?.into_owned();
    let outside = reproject_polygon( &bbox_polygon( 401_000.0, 3_408_000.0, 402_000.0, 3_409_000.0), "EPSG:32650", "EPSG:4326")?.into_owned();
    println!("inside: {inside:?}");

    let checked = validate_aoi( &inside, "EPSG:4326", &meta);
    assert!( matches!( checked, Some(Cow::Owned(_))));
    println!("{:?}", checked.map( |p| p.into_owned()));

    assert!( matches!( check_aoi( &outside, "EPSG:4326", &meta), Err(ClipError::NotContained)));
    Ok(())
}

#[test]
fn test_check_aoi_bad_crs() -> anyhow::Result<()> {
    let meta = utm_meta()?;
    let aoi = bbox_polygon( 400_300.0, 3_397_300.0, 400_900.0, 3_397_900.0);

    let err = check_aoi( &aoi, "no such crs", &meta).unwrap_err();
    println!("{err}");
    assert!( matches!( err, ClipError::UnrecognizedCrs(_)));
    assert!( err.is_validation_failure());
    assert!( validate_aoi( &aoi, "no such crs", &meta).is_none());
    Ok(())
}

#[test]
fn test_error_mapping() {
    assert!( matches!( ClipError::from( OdinGdalError::ReprojectionError("x".into())), ClipError::Reprojection(_)));
    assert!( matches!( ClipError::from( OdinGdalError::RasterOpenError("x".into())), ClipError::RasterOpen(_)));
    assert!( matches!( ClipError::from( OdinGdalError::RasterWriteError("x".into())), ClipError::RasterWrite(_)));
    assert!( matches!( ClipError::from( OdinGdalError::MiscError("x".into())), ClipError::OdinGdalError(_)));

    assert!( ClipError::NotContained.is_validation_failure());
    assert!( !ClipError::EmptyClipRegion.is_validation_failure());
    assert!( !ClipError::RasterWrite("x".into()).is_validation_failure());
}
