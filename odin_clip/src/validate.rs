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

//! checks whether an area of interest is fully covered by a raster

use std::{borrow::Cow, panic};
use geo::{CoordsIter, Polygon, Relate};
use tracing::{info, warn};

use odin_gdal::{Crs, RasterMeta, reproject_polygon_crs};
use crate::errors::{ClipError, Result, validation_error};

/// true if `aoi` lies within `bounds` or is topologically equal to it (both in the same CRS).
/// Touching the boundary from inside counts as contained
pub fn check_containment (aoi: &Polygon<f64>, bounds: &Polygon<f64>)->Result<bool> {
    for p in [aoi, bounds] {
        if p.exterior().0.len() < 4 {
            return Err( validation_error( format!("degenerate ring with {} vertices", p.exterior().0.len())))
        }
        if p.coords_iter().any( |c| !(c.x.is_finite() && c.y.is_finite())) {
            return Err( validation_error("non-finite vertex coordinates"))
        }
    }

    let im = panic::catch_unwind( || aoi.relate( bounds))
        .map_err( |_| validation_error("topology evaluation failed"))?;

    Ok( im.is_within() || im.is_equal_topo() )
}

/// lenient version of [`check_containment`] that treats all evaluation failures as "not contained"
pub fn is_contained (aoi: &Polygon<f64>, bounds: &Polygon<f64>)->bool {
    match check_containment( aoi, bounds) {
        Ok(contained) => contained,
        Err(e) => {
            warn!("{e}");
            false
        }
    }
}

/// reproject `aoi` (given in `aoi_crs`) into the CRS of the raster described by `meta` and make sure
/// the raster covers it completely. Returns the AOI in raster CRS
pub fn check_aoi<'a> (aoi: &'a Polygon<f64>, aoi_crs: &str, meta: &RasterMeta)->Result<Cow<'a,Polygon<f64>>> {
    let aoi_crs = Crs::normalize( aoi_crs)?;
    let reprojected = reproject_polygon_crs( aoi, &aoi_crs, &meta.crs)?;

    if check_containment( &reprojected, &meta.bounds_polygon())? {
        info!("boundary is within image {:?}", meta.path);
        Ok( reprojected )
    } else {
        warn!("boundary is not within image {:?}", meta.path);
        Err( ClipError::NotContained )
    }
}

/// like [`check_aoi`] but only reports if the AOI can be clipped from the raster. Failures are logged
pub fn validate_aoi<'a> (aoi: &'a Polygon<f64>, aoi_crs: &str, meta: &RasterMeta)->Option<Cow<'a,Polygon<f64>>> {
    match check_aoi( aoi, aoi_crs, meta) {
        Ok(aoi) => Some(aoi),
        Err(ClipError::NotContained) => None, // already logged
        Err(e) => {
            warn!("boundary validation against {:?} failed: {e}", meta.path);
            None
        }
    }
}
