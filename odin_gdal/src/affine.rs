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

//! pixel <-> world mapping of a raster grid

use serde::{Deserialize,Serialize};
use crate::GeoTransform;

/// the 6 coefficient affine map from pixel (col,row) to world (x,y) coordinates:
/// ```text
///   x = a + b*col + c*row
///   y = d + e*col + f*row
/// ```
/// This is the coefficient order of a GDAL `GeoTransform`, i.e. `[a,b,c,d,e,f]`
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64
}

impl AffineTransform {
    pub fn new (a: f64, b: f64, c: f64, d: f64, e: f64, f: f64)->Self {
        AffineTransform { a, b, c, d, e, f }
    }

    /// a transform without rotation terms
    pub fn north_up (x_origin: f64, x_res: f64, y_origin: f64, y_res: f64)->Self {
        AffineTransform::new( x_origin, x_res, 0.0, y_origin, 0.0, y_res)
    }

    pub fn from_gdal (gt: &GeoTransform)->Self {
        AffineTransform::new( gt[0], gt[1], gt[2], gt[3], gt[4], gt[5])
    }

    pub fn to_gdal (&self)->GeoTransform {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    /// map (fractional) pixel coordinates to world coordinates
    #[inline]
    pub fn apply (&self, col: f64, row: f64)->(f64,f64) {
        ( self.a + self.b * col + self.c * row,
          self.d + self.e * col + self.f * row )
    }

    /// world coordinates of the center of pixel (col,row)
    #[inline]
    pub fn pixel_center (&self, col: usize, row: usize)->(f64,f64) {
        self.apply( col as f64 + 0.5, row as f64 + 0.5)
    }

    /// determinant of the linear (b,c,e,f) part
    pub fn determinant (&self)->f64 {
        self.b * self.f - self.c * self.e
    }

    pub fn is_invertible (&self)->bool {
        let det = self.determinant();
        det.is_finite() && det != 0.0
    }

    /// the world -> pixel map, which has the same form with (x,y) as input and (col,row) as output.
    /// Returns `None` if the linear part is singular
    pub fn invert (&self)->Option<AffineTransform> {
        if !self.is_invertible() { return None }

        let inv_det = 1.0 / self.determinant();
        let b = self.f * inv_det;
        let c = -self.c * inv_det;
        let e = -self.e * inv_det;
        let f = self.b * inv_det;

        let a = -(b * self.a + c * self.d);
        let d = -(e * self.a + f * self.d);

        Some( AffineTransform { a, b, c, d, e, f } )
    }

    /// compose with a pure pixel space translation so that pixel (0,0) of the result maps to
    /// the same world coordinate as pixel (col,row) of self. Linear coefficients are unchanged
    pub fn translated (&self, col: usize, row: usize)->AffineTransform {
        let (a, d) = self.apply( col as f64, row as f64);
        AffineTransform { a, d, ..*self }
    }

    /// world coordinates of the four grid corners of a width x height raster in
    /// (0,0), (width,0), (width,height), (0,height) pixel order
    pub fn grid_corners (&self, width: usize, height: usize)->[(f64,f64);4] {
        let w = width as f64;
        let h = height as f64;
        [ self.apply( 0.0, 0.0), self.apply( w, 0.0), self.apply( w, h), self.apply( 0.0, h) ]
    }
}

impl From<GeoTransform> for AffineTransform {
    fn from (gt: GeoTransform)->Self { AffineTransform::from_gdal( &gt) }
}

impl From<AffineTransform> for GeoTransform {
    fn from (at: AffineTransform)->Self { at.to_gdal() }
}
