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

//! canonical CRS identifiers and polygon reprojection
//!
//! All CRS equality checks go through [`Crs`], i.e. they compare normalized forms, never raw descriptors.

use std::{borrow::Cow, fmt};
use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, CoordTransformOptions, SpatialRef};
use geo::{Coord, LineString, Polygon};
use serde::{Deserialize,Serialize};
use tracing::{debug,info,warn};

use crate::run_quiet;
use crate::errors::{Result, unrecognized_crs, reprojection_error};

/// a normalized CRS identifier. This is either a registry code in "AUTHORITY:CODE" form (e.g. "EPSG:4326")
/// or, if the CRS does not match any registry entry, its normalized WKT.
/// Two `Crs` values are equal iff their canonical identifiers match exactly
#[derive(Debug,Clone,PartialEq,Eq,Hash,Serialize,Deserialize)]
pub struct Crs(String);

impl Crs {
    /// normalize a CRS descriptor, which can be a numeric code ("4326"), an "AUTHORITY:CODE" string,
    /// a PROJ string or a WKT definition
    pub fn normalize (descriptor: &str)->Result<Crs> {
        let descr = descriptor.trim();
        if descr.is_empty() { return Err( unrecognized_crs("empty CRS descriptor")) }

        let mut srs = run_quiet( || {
            if let Ok(code) = descr.parse::<u32>() {
                Ok( SpatialRef::from_epsg( code)? )
            } else {
                Ok( SpatialRef::from_definition( descr)? )
            }
        }).map_err( |_| unrecognized_crs( descr))?;

        Crs::from_spatial_ref( &mut srs)
            .map_err( |_| unrecognized_crs( descr))
    }

    pub fn from_epsg (code: u32)->Result<Crs> {
        Crs::normalize( &format!("EPSG:{code}"))
    }

    pub fn wgs84 ()->Crs {
        Crs("EPSG:4326".to_string())
    }

    /// normalize an existing SpatialRef (e.g. obtained from a Dataset)
    pub fn from_spatial_ref (srs: &mut SpatialRef)->Result<Crs> {
        if let Some(auth) = registry_code( srs) {
            Ok( Crs(auth) )
        } else {
            let wkt = srs.to_wkt()?;
            if wkt.is_empty() { return Err( unrecognized_crs("empty spatial reference")) }
            warn!("no registry code for CRS, using WKT as identifier");
            Ok( Crs(wkt) )
        }
    }

    pub fn as_str (&self)->&str {
        self.0.as_str()
    }

    /// the numeric EPSG code if this is an EPSG registry identifier
    pub fn epsg (&self)->Option<u32> {
        self.0.strip_prefix("EPSG:").and_then( |code| code.parse::<u32>().ok())
    }

    pub fn is_registry_code (&self)->bool {
        !self.0.contains('[') && self.0.contains(':')
    }

    /// a SpatialRef for this CRS that uses traditional GIS (x=lon/easting, y=lat/northing) axis order
    pub fn spatial_ref (&self)->Result<SpatialRef> {
        let mut srs = match self.epsg() {
            Some(code) => SpatialRef::from_epsg( code)?,
            None => SpatialRef::from_definition( self.as_str())?
        };
        srs.set_axis_mapping_strategy( AxisMappingStrategy::TraditionalGisOrder);
        Ok(srs)
    }
}

impl fmt::Display for Crs {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        if self.is_registry_code() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "WKT({} chars)", self.0.len())
        }
    }
}

/// get "AUTHORITY:CODE" for the given srs, trying to identify an EPSG code if the definition did not carry one
fn registry_code (srs: &mut SpatialRef)->Option<String> {
    if let Ok(auth) = srs.authority() {
        return Some( auth.to_uppercase())
    }

    if run_quiet( || Ok( srs.auto_identify_epsg()? )).is_ok() {
        if let Ok(auth) = srs.authority() {
            debug!("identified CRS as {auth}");
            return Some( auth.to_uppercase())
        }
    }

    None
}

/// normalize both descriptors and compare
pub fn is_same_crs (descr_a: &str, descr_b: &str)->Result<bool> {
    Ok( Crs::normalize( descr_a)? == Crs::normalize( descr_b)? )
}

/// reproject `polygon` from the `src` into the `tgt` CRS.
/// If both descriptors normalize to the same CRS the input polygon is returned as is (borrowed),
/// otherwise every vertex (exterior and interior rings) is transformed, preserving order and ring closure
pub fn reproject_polygon<'a> (polygon: &'a Polygon<f64>, src: &str, tgt: &str)->Result<Cow<'a,Polygon<f64>>> {
    let src_crs = Crs::normalize( src)?;
    let tgt_crs = Crs::normalize( tgt)?;
    reproject_polygon_crs( polygon, &src_crs, &tgt_crs)
}

/// [`reproject_polygon`] for already normalized CRS values
pub fn reproject_polygon_crs<'a> (polygon: &'a Polygon<f64>, src_crs: &Crs, tgt_crs: &Crs)->Result<Cow<'a,Polygon<f64>>> {
    if src_crs == tgt_crs {
        debug!("polygon already in {tgt_crs}, no reprojection needed");
        return Ok( Cow::Borrowed(polygon))
    }

    info!("reprojecting polygon {src_crs} -> {tgt_crs}");
    let transform = create_transform( src_crs, tgt_crs)?;

    let exterior = transform_ring( &transform, polygon.exterior())?;
    let mut interiors: Vec<LineString<f64>> = Vec::with_capacity( polygon.interiors().len());
    for ring in polygon.interiors() {
        interiors.push( transform_ring( &transform, ring)?);
    }

    Ok( Cow::Owned( Polygon::new( exterior, interiors)) )
}

fn create_transform (src_crs: &Crs, tgt_crs: &Crs)->Result<CoordTransform> {
    let s_srs = src_crs.spatial_ref().map_err( |e| reprojection_error( format!("source {src_crs}: {e}")))?;
    let t_srs = tgt_crs.spatial_ref().map_err( |e| reprojection_error( format!("target {tgt_crs}: {e}")))?;

    let mut ct_options = CoordTransformOptions::new()?;
    ct_options.desired_accuracy( 0.0);
    ct_options.set_ballpark_allowed(false);

    CoordTransform::new_with_options( &s_srs, &t_srs, &ct_options)
        .map_err( |e| reprojection_error( format!("no transform {src_crs} -> {tgt_crs}: {e}")))
}

fn transform_ring (transform: &CoordTransform, ring: &LineString<f64>)->Result<LineString<f64>> {
    let mut xs: Vec<f64> = ring.coords().map( |c| c.x).collect();
    let mut ys: Vec<f64> = ring.coords().map( |c| c.y).collect();
    let mut zs: [f64;0] = [];

    transform.transform_coords( &mut xs, &mut ys, &mut zs)
        .map_err( |e| reprojection_error( e))?;

    let coords: Vec<Coord<f64>> = xs.into_iter().zip( ys).map( |(x,y)| Coord { x, y }).collect();
    if let Some(c) = coords.iter().find( |c| !(c.x.is_finite() && c.y.is_finite())) {
        return Err( reprojection_error( format!("non-finite transformed vertex ({},{})", c.x, c.y)))
    }

    Ok( LineString::new( coords) )
}
