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

//! resolving free-text place queries into areas of interest

use geo::{LineString, Point, Polygon};
use reqwest::blocking;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::ClipConfig;
use crate::errors::{ClipError, Result, boundary_not_found, config_error};

/// what a boundary lookup resolved a query into
#[derive(Debug,Clone,PartialEq)]
pub enum Aoi {
    Area(Polygon<f64>),
    /// the query only resolved to a location without area
    Point(Point<f64>)
}

impl Aoi {
    /// true if the lookup fell back to a point
    pub fn is_fallback (&self)->bool {
        matches!( self, Aoi::Point(_))
    }

    pub fn polygon (&self)->Option<&Polygon<f64>> {
        match self {
            Aoi::Area(polygon) => Some(polygon),
            Aoi::Point(_) => None
        }
    }
}

/// external collaborator that turns a place query into an [`Aoi`]
pub trait BoundaryLookup {
    fn lookup (&self, query: &str)->Result<Aoi>;

    /// the CRS of returned AOIs
    fn crs (&self)->&str { "EPSG:4326" }
}

/// the closed rectangle (w,s) -> (w,n) -> (e,n) -> (e,s) -> (w,s)
pub fn bbox_polygon (west: f64, south: f64, east: f64, north: f64)->Polygon<f64> {
    Polygon::new(
        LineString::from( vec![ (west,south), (west,north), (east,north), (east,south), (west,south) ]),
        vec![]
    )
}

/* #region static lookup ****************************************************************************************/

/// a lookup that always returns the same AOI, regardless of query
#[derive(Debug,Clone)]
pub struct StaticLookup {
    aoi: Aoi,
    crs: String
}

impl StaticLookup {
    pub fn new (aoi: Aoi, crs: impl ToString)->Self {
        StaticLookup { aoi, crs: crs.to_string() }
    }

    pub fn from_bbox (west: f64, south: f64, east: f64, north: f64, crs: impl ToString)->Self {
        StaticLookup::new( Aoi::Area( bbox_polygon( west, south, east, north)), crs)
    }
}

impl BoundaryLookup for StaticLookup {
    fn lookup (&self, query: &str)->Result<Aoi> {
        debug!("static boundary for query '{query}'");
        Ok( self.aoi.clone())
    }

    fn crs (&self)->&str {
        self.crs.as_str()
    }
}

/* #endregion static lookup */

/* #region nominatim lookup *************************************************************************************/

/// a lookup that uses a Nominatim geocoding service. Areas are approximated by the bounding box of the best match
pub struct NominatimLookup {
    client: blocking::Client,
    url: String,
    crs: String
}

impl NominatimLookup {
    pub fn new (config: &ClipConfig)->Result<Self> {
        let client = blocking::Client::builder()
            .user_agent( config.user_agent.as_str())
            .timeout( config.lookup_timeout)
            .build()
            .map_err( |e| config_error( format!("cannot create http client: {e}")))?;

        Ok( NominatimLookup { client, url: config.nominatim_url.clone(), crs: config.aoi_crs.clone() } )
    }
}

impl BoundaryLookup for NominatimLookup {
    fn lookup (&self, query: &str)->Result<Aoi> {
        let params: [(&str,&str);4] = [ ("q", query), ("format", "jsonv2"), ("limit", "1"), ("polygon_geojson", "1") ];

        let resp = self.client.get( self.url.as_str())
            .query( &params)
            .send()
            .and_then( |resp| resp.error_for_status())
            .map_err( |e| boundary_not_found( format!("{query}: {e}")))?;

        let body = resp.text().map_err( |e| boundary_not_found( format!("{query}: {e}")))?;
        aoi_from_response( query, &body)
    }

    fn crs (&self)->&str {
        self.crs.as_str()
    }
}

#[derive(Deserialize,Debug)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    boundingbox: Vec<String>, // [south, north, west, east]
    #[serde(default)]
    display_name: String,
    geojson: Option<NominatimGeometry>
}

#[derive(Deserialize,Debug)]
struct NominatimGeometry {
    #[serde(rename="type")]
    geometry_type: String
}

/// turn a Nominatim jsonv2 search response into an [`Aoi`]. Hits with (multi)polygon geometry yield their
/// bounding box, everything else falls back to the hit location
pub fn aoi_from_response (query: &str, body: &str)->Result<Aoi> {
    let places: Vec<NominatimPlace> = serde_json::from_str( body)
        .map_err( |e| boundary_not_found( format!("{query}: malformed response ({e})")))?;
    let Some(place) = places.into_iter().next() else {
        return Err( boundary_not_found( query))
    };
    info!("query '{query}' resolved to '{}'", place.display_name);

    let is_area = place.geojson.as_ref()
        .map( |g| g.geometry_type == "Polygon" || g.geometry_type == "MultiPolygon")
        .unwrap_or(false);

    if is_area {
        match parse_bbox( &place.boundingbox) {
            Some((west,south,east,north)) => return Ok( Aoi::Area( bbox_polygon( west, south, east, north))),
            None => warn!("ignoring unusable bounding box {:?} for '{query}'", place.boundingbox)
        }
    }

    let lon = parse_coord( &place.lon, query)?;
    let lat = parse_coord( &place.lat, query)?;
    warn!("query '{query}' has no area boundary, falling back to point ({lon},{lat})");
    Ok( Aoi::Point( Point::new( lon, lat)) )
}

fn parse_bbox (bbox: &[String])->Option<(f64,f64,f64,f64)> {
    let vs: Vec<f64> = bbox.iter().filter_map( |s| s.trim().parse::<f64>().ok()).collect();
    if let [south, north, west, east] = vs[..] {
        if [south,north,west,east].iter().all( |v| v.is_finite()) && south < north && west < east {
            return Some( (west, south, east, north) )
        }
    }
    None
}

fn parse_coord (s: &str, query: &str)->Result<f64> {
    s.trim().parse::<f64>().map_err( |_| ClipError::BoundaryNotFound( format!("{query}: invalid coordinate '{s}'")))
}

/* #endregion nominatim lookup */
