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

//! clipping of georeferenced rasters to areas of interest (AOIs).
//!
//! The pipeline resolves a place query into a boundary polygon, reprojects it into the CRS of the
//! raster, makes sure the raster covers it completely, and then writes a new GeoTIFF that is cropped
//! to the boundary with all pixels outside of it set to the band nodata value (or zero)

pub mod errors;
pub mod config;
pub mod mask;
pub mod clipper;
pub mod validate;
pub mod lookup;
pub mod output;

use std::path::{Path, PathBuf};
use geo::Polygon;
use tracing::{info, warn};

use odin_gdal::{RasterSource, read_raster_meta};

pub use errors::{ClipError, Result};
pub use config::{ClipConfig, load_config};
pub use mask::{Mask, PixelBox, rasterize_mask};
pub use clipper::{ClipWindow, ClippedRaster, clip_array, clip_geo_raster, clip_source, clip_raster};
pub use validate::{check_aoi, check_containment, validate_aoi};
pub use lookup::{Aoi, BoundaryLookup, NominatimLookup, StaticLookup};
pub use output::{SessionDir, ensure_tif_extension};

/// clip the raster at `raster_path` to `polygon` (given in `polygon_crs`) and write it to `output`.
/// Fails with [`ClipError::NotContained`] if the raster does not fully cover the polygon
pub fn clip_polygon (polygon: &Polygon<f64>, polygon_crs: &str, raster_path: impl AsRef<Path>, output: &Path, compress: bool)->Result<PathBuf> {
    let src = RasterSource::open( raster_path)?;

    let aoi = match check_aoi( polygon, polygon_crs, src.meta()) {
        Ok(aoi) => aoi,
        Err(e) => {
            src.release();
            return Err(e)
        }
    };

    clip_raster( src, &aoi, output, compress)
}

/// the clip pipeline: boundary lookup -> validation -> clip -> write
pub struct AoiClipper<L: BoundaryLookup> {
    lookup: L,
    config: ClipConfig,
    session: SessionDir
}

impl<L: BoundaryLookup> AoiClipper<L> {
    /// create a clipper with a new output session below `config.output_root`
    pub fn new (lookup: L, config: ClipConfig)->Result<Self> {
        let session = SessionDir::create( &config.output_root)?;
        Ok( AoiClipper { lookup, config, session } )
    }

    pub fn with_session (lookup: L, config: ClipConfig, session: SessionDir)->Self {
        AoiClipper { lookup, config, session }
    }

    pub fn config (&self)->&ClipConfig { &self.config }

    pub fn session (&self)->&SessionDir { &self.session }

    pub fn into_session (self)->SessionDir { self.session }

    /// resolve `query` into a boundary polygon. Point-only results are rejected
    pub fn resolve_boundary (&self, query: &str)->Result<Polygon<f64>> {
        match self.lookup.lookup( query)? {
            Aoi::Area(polygon) => Ok(polygon),
            Aoi::Point(p) => {
                warn!("no area boundary for '{query}', only point ({},{})", p.x(), p.y());
                Err( ClipError::PointBoundary( query.to_string()))
            }
        }
    }

    /// clip `raster_path` to the boundary of `query` and write the result to `output_path`, or to a
    /// fresh file in the session directory if `output_path` is empty. Returns the written path
    pub fn clip (&self, query: &str, raster_path: impl AsRef<Path>, output_path: &str)->Result<PathBuf> {
        let raster_path = raster_path.as_ref();
        let polygon = self.resolve_boundary( query)?;
        let output = self.session.resolve_output( output_path);

        info!("clipping {raster_path:?} to '{query}'");
        clip_polygon( &polygon, self.lookup.crs(), raster_path, &output, self.config.compress)
    }

    /// check if the boundary of `query` can be clipped from `raster_path`. All failures are logged and
    /// reported as `false`
    pub fn validate_bounds (&self, query: &str, raster_path: impl AsRef<Path>)->bool {
        let polygon = match self.resolve_boundary( query) {
            Ok(polygon) => polygon,
            Err(e) => {
                warn!("cannot validate '{query}': {e}");
                return false
            }
        };

        match read_raster_meta( raster_path) {
            Ok(meta) => validate_aoi( &polygon, self.lookup.crs(), &meta).is_some(),
            Err(e) => {
                warn!("cannot validate '{query}': {e}");
                false
            }
        }
    }
}
