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

//! cropping and masking of raster buffers to a polygon

use std::{fs, path::{Path, PathBuf}};
use geo::Polygon;
use ndarray::{Array3, ArrayView2, Axis, Zip, s};
use tracing::{debug, info};

use odin_gdal::{AffineTransform, Crs, GeoRaster, RasterBuffer, RasterElement, RasterSource, with_raster_buffer};
use crate::errors::{ClipError, Result};
use crate::mask::{Mask, PixelBox, rasterize_mask};

/// the result of clipping a raster to a polygon
#[derive(Debug,Clone)]
pub struct ClippedRaster {
    /// cropped and masked pixels with the adjusted transform
    pub raster: GeoRaster,
    /// the crop window in pixel coordinates of the source grid
    pub pixel_box: PixelBox,
    /// number of pixels per band that lie inside of the polygon
    pub included: usize
}

impl ClippedRaster {
    pub fn write (&self, path: impl AsRef<Path>, compress: bool)->Result<()> {
        Ok( self.raster.write( path, compress)? )
    }
}

/// per-band fill values for excluded pixels: the band nodata value if it is representable in T, zero otherwise
pub fn fill_values<T: RasterElement> (nodata: &[Option<f64>], n_bands: usize)->Vec<T> {
    (0..n_bands).map( |k| {
        nodata.get(k).copied().flatten()
            .and_then( |nd| num::cast::<f64,T>(nd))
            .unwrap_or_else( T::zero)
    }).collect()
}

/// the (bands, min_row..=max_row, min_col..=max_col) sub-array
pub fn crop_array<T: Clone> (data: &Array3<T>, bbox: &PixelBox)->Array3<T> {
    data.slice( s![ .., bbox.min_row..=bbox.max_row, bbox.min_col..=bbox.max_col ]).to_owned()
}

/// overwrite all pixels that are excluded by `mask` with the fill value of their band.
/// `mask` has to have the same (rows,cols) shape as `data`
pub fn apply_mask<T: RasterElement> (data: &mut Array3<T>, mask: ArrayView2<bool>, fill: &[T]) {
    for (k, mut band) in data.axis_iter_mut( Axis(0)).enumerate() {
        let v = fill.get(k).copied().unwrap_or_else( T::zero);
        Zip::from( &mut band).and( &mask).for_each( |p, &ex| if ex { *p = v });
    }
}

/// the crop window of a polygon over a raster grid: the tight box around all included pixels and the
/// part of the mask that lies within it. Only computed from the complete mask
#[derive(Debug,Clone)]
pub struct ClipWindow {
    pub pixel_box: PixelBox,
    pub mask: Mask,
    pub included: usize
}

impl ClipWindow {
    /// rasterize `polygon` over a width x height grid. Fails if no pixel lies inside of the polygon
    pub fn new (polygon: &Polygon<f64>, transform: &AffineTransform, width: usize, height: usize)->Result<ClipWindow> {
        let mask = rasterize_mask( polygon, transform, width, height)?;
        let pixel_box = mask.bounding_box().ok_or( ClipError::EmptyClipRegion)?;
        let included = mask.included_count();
        debug!("clip window rows {}..={} cols {}..={} ({} pixels inside)",
               pixel_box.min_row, pixel_box.max_row, pixel_box.min_col, pixel_box.max_col, included);

        Ok( ClipWindow { mask: mask.crop( &pixel_box), pixel_box, included } )
    }

    /// fill all excluded pixels of `data`, which has to be already cropped to this window
    pub fn apply<T: RasterElement> (&self, mut data: Array3<T>, nodata: &[Option<f64>])->Array3<T> {
        let fill = fill_values::<T>( nodata, data.len_of( Axis(0)));
        apply_mask( &mut data, self.mask.view(), &fill);
        data
    }

    /// the transform of the upper left window pixel
    pub fn transform (&self, transform: &AffineTransform)->AffineTransform {
        transform.translated( self.pixel_box.min_col, self.pixel_box.min_row)
    }

    fn into_clipped (self, buffer: RasterBuffer, transform: &AffineTransform, crs: &Crs, nodata: &[Option<f64>])->ClippedRaster {
        ClippedRaster {
            raster: GeoRaster {
                buffer,
                transform: self.transform( transform),
                crs: crs.clone(),
                nodata: nodata.to_vec()
            },
            pixel_box: self.pixel_box,
            included: self.included
        }
    }
}

/// crop `data` to the bounding box of the included pixels and mask everything outside of `polygon`.
/// Returns the cropped array, the transform of its upper left pixel and the crop box
pub fn clip_array<T: RasterElement> (data: &Array3<T>, polygon: &Polygon<f64>, transform: &AffineTransform, nodata: &[Option<f64>])
                  ->Result<(Array3<T>,AffineTransform,PixelBox)> {
    let (_, height, width) = data.dim();
    let window = ClipWindow::new( polygon, transform, width, height)?;
    let cropped = window.apply( crop_array( data, &window.pixel_box), nodata);

    Ok( (cropped, window.transform( transform), window.pixel_box) )
}

/// clip an in-memory raster. `polygon` has to be in the CRS of `raster`
pub fn clip_geo_raster (raster: &GeoRaster, polygon: &Polygon<f64>)->Result<ClippedRaster> {
    let (_, height, width) = raster.shape();
    let window = ClipWindow::new( polygon, &raster.transform, width, height)?;
    let buffer = with_raster_buffer!( &raster.buffer, data => {
        RasterElement::into_buffer( window.apply( crop_array( data, &window.pixel_box), &raster.nodata))
    });

    Ok( window.into_clipped( buffer, &raster.transform, &raster.crs, &raster.nodata) )
}

/// clip an open raster dataset, reading only the pixel window that covers the polygon.
/// `polygon` has to be in the CRS of `src`
pub fn clip_source (src: &RasterSource, polygon: &Polygon<f64>)->Result<ClippedRaster> {
    let meta = src.meta();
    let window = ClipWindow::new( polygon, &meta.transform, meta.width, meta.height)?;

    let pb = &window.pixel_box;
    let data = src.read_window( pb.min_col, pb.min_row, pb.width(), pb.height())?;
    let buffer = with_raster_buffer!( data, data => RasterElement::into_buffer( window.apply( data, &meta.nodata)));

    Ok( window.into_clipped( buffer, &meta.transform, &meta.crs, &meta.nodata) )
}

/// clip `src` to `polygon` and write the result to `output`, creating missing parent directories once the
/// clip succeeded. The source is released on all exit paths
pub fn clip_raster (src: RasterSource, polygon: &Polygon<f64>, output: &Path, compress: bool)->Result<PathBuf> {
    let res = clip_source( &src, polygon).and_then( |clipped| {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all( parent)?;
            }
        }
        clipped.write( output, compress)?;

        let (n_bands, height, width) = clipped.raster.shape();
        info!("clipped {:?} to {output:?} ({n_bands}x{height}x{width})", src.meta().path);
        Ok( output.to_path_buf())
    });
    src.release();
    res
}
