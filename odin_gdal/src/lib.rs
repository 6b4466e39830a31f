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

//! GDAL interop for raster clipping: canonical CRS identifiers, polygon reprojection,
//! raster metadata, typed multi-band pixel buffers and GeoTIFF output

pub mod errors;
pub mod affine;
pub mod crs;
pub mod raster;

use std::{collections::HashMap, path::Path, sync::Mutex};
use lazy_static::lazy_static;

// we re-export these so that other crates don't have to use a direct gdal depedency to import.
// this is to ensure we run bindgen for new GDAL versions that don't yet have pre-computed bindings in gdal-sys
pub use gdal::{self, Driver, DriverManager, Dataset, GeoTransform, cpl::CslStringList};
pub use gdal::raster::{GdalType, GdalDataType, RasterBand, Buffer, RasterCreationOptions};
pub use gdal::spatial_ref::{CoordTransform, SpatialRef};

pub use affine::AffineTransform;
pub use crs::{Crs, is_same_crs, reproject_polygon, reproject_polygon_crs};
pub use raster::{RasterBuffer, RasterElement, RasterMeta, RasterSource, GeoRaster, read_raster_meta};

use crate::errors::Result;

lazy_static! {
    // note that we can't automatically populate this by iterating over DriverManager since some
    // drivers use the same file extension. We only list drivers that support direct (typed, multi-band) creation
    static ref EXT_MAP: HashMap<&'static str, &'static str> = HashMap::from( [ // file extension -> driver short name
        ("tif", "GTiff"),
        ("tiff", "GTiff"),
        ("img", "HFA"),
        ("nc", "netCDF"),
    ]);
}

/// use this to protect non-threadsafe GDAL operations
static GLOB_GDAL_MUTEX: Mutex<usize> = Mutex::new(0);

/// Note that filename extension has to be lower case
pub fn get_driver_name_from_filename (filename: &str) -> Option<&'static str> {
    Path::new(filename).extension()
        .and_then( |ext| ext.to_str())
        .and_then( |ext| EXT_MAP.get( ext))
        .map( |v| &**v)
}

/// Note that filename extension has to be lowercase
pub fn get_driver_from_filename (filename: &str) -> Option<Driver> {
    get_driver_name_from_filename( filename)
        .and_then( |n| DriverManager::get_driver_by_name( n).ok())
}

/// run the provided closure with the global GDAL error handler disabled. Note this does not
/// change the return value but prevents GDAL from printing errors and warnings to the console
pub fn run_quiet<T,F> (f: F)->Result<T> where F: FnOnce()->Result<T> {
    let _lock = GLOB_GDAL_MUTEX.lock().unwrap_or_else( |poisoned| poisoned.into_inner());
    unsafe { gdal_sys::CPLPushErrorHandler( Some(gdal_sys::CPLQuietErrorHandler)); }
    let result = f();
    unsafe { gdal_sys::CPLPopErrorHandler(); }
    result
}

/// GTiff creation options. Horizontal differencing only pays off for integer types
pub fn compress_create_opts (data_type: GdalDataType)->Result<RasterCreationOptions> {
    use GdalDataType::*;

    let mut co = RasterCreationOptions::new();
    co.add_name_value("COMPRESS", "DEFLATE")?;
    match data_type {
        Float32 | Float64 => {}
        _ => co.add_name_value("PREDICTOR", "2")?
    }
    Ok(co)
}

/// create a new dataset with `n_bands` bands of the given element type. Element types without a direct
/// counterpart in Rust (complex, unknown) are created as Float64
pub fn create_dataset<P> (driver: &Driver, path: P, width: usize, height: usize, n_bands: usize, data_type: GdalDataType, co: Option<RasterCreationOptions>)->Result<Dataset>
    where P: AsRef<Path>
{
    use GdalDataType::*;
    let co = co.as_ref();
    let size = (width, height, n_bands);

    match data_type {
        UInt8   => create_typed::<u8,P>( driver, path, size, co),
        UInt16  => create_typed::<u16,P>( driver, path, size, co),
        UInt32  => create_typed::<u32,P>( driver, path, size, co),
        UInt64  => create_typed::<u64,P>( driver, path, size, co),
        Int8    => create_typed::<i8,P>( driver, path, size, co),
        Int16   => create_typed::<i16,P>( driver, path, size, co),
        Int32   => create_typed::<i32,P>( driver, path, size, co),
        Int64   => create_typed::<i64,P>( driver, path, size, co),
        Float32 => create_typed::<f32,P>( driver, path, size, co),
        _       => create_typed::<f64,P>( driver, path, size, co),
    }
}

fn create_typed<T,P> (driver: &Driver, path: P, size: (usize,usize,usize), co: Option<&RasterCreationOptions>)->Result<Dataset>
    where T: GdalType, P: AsRef<Path>
{
    let (width, height, n_bands) = size;
    let ds = match co {
        Some(co) => driver.create_with_band_type_with_options::<T,P>( path, width, height, n_bands, co)?,
        None => driver.create_with_band_type::<T,P>( path, width, height, n_bands)?
    };
    Ok(ds)
}

/// check if dimensions and raster type of all bands are the same
pub fn is_homogenous (ds: &Dataset)->bool {
    let (n_cols, n_rows) = ds.raster_size();
    let n_bands = ds.raster_count();
    if n_bands == 0 { return false }

    let Ok(band) = ds.rasterband(1) else { return false };
    let band_type = band.band_type();
    let (w,h) = band.size();
    if w != n_cols || h != n_rows { return false }

    for i in 2..=n_bands {
        let Ok(band) = ds.rasterband(i) else { return false };
        if band.band_type() != band_type { return false }
        let (w,h) = band.size();
        if w != n_cols || h != n_rows { return false }
    }

    true
}
