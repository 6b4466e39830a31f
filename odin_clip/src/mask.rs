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

//! polygon -> pixel mask rasterization
//!
//! Masks use the "exclude" convention: a `true` cell lies outside of the polygon. A pixel is included if its
//! center is inside of the polygon or exactly on one of its edges.

use std::ops::RangeInclusive;
use geo::{BoundingRect, Coord, CoordsIter, Polygon, Validation};
use geo::coordinate_position::{CoordPos, CoordinatePosition};
use ndarray::{Array2, ArrayView2, s};
use rayon::prelude::*;
use tracing::debug;

use odin_gdal::AffineTransform;
use crate::errors::{Result, invalid_polygon};

/// inclusive (row,col) pixel index box
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct PixelBox {
    pub min_row: usize,
    pub max_row: usize,
    pub min_col: usize,
    pub max_col: usize
}

impl PixelBox {
    pub fn width (&self)->usize { self.max_col - self.min_col + 1 }
    pub fn height (&self)->usize { self.max_row - self.min_row + 1 }

    pub fn contains (&self, row: usize, col: usize)->bool {
        row >= self.min_row && row <= self.max_row && col >= self.min_col && col <= self.max_col
    }
}

/// boolean (height,width) grid aligned 1:1 with a raster grid. `true` means excluded
#[derive(Debug,Clone,PartialEq)]
pub struct Mask {
    excluded: Array2<bool>
}

impl Mask {
    /// (rows,cols)
    pub fn shape (&self)->(usize,usize) {
        self.excluded.dim()
    }

    pub fn view (&self)->ArrayView2<'_,bool> {
        self.excluded.view()
    }

    pub fn is_excluded (&self, row: usize, col: usize)->bool {
        self.excluded.get( (row,col)).copied().unwrap_or(true)
    }

    pub fn included_count (&self)->usize {
        self.excluded.iter().filter( |ex| !**ex).count()
    }

    /// true if every pixel is excluded
    pub fn is_empty (&self)->bool {
        self.excluded.iter().all( |ex| *ex)
    }

    /// the tight box around all included pixels, `None` if there are none.
    /// This has to be computed from the complete mask
    pub fn bounding_box (&self)->Option<PixelBox> {
        let mut bbox: Option<PixelBox> = None;

        for ((row,col), ex) in self.excluded.indexed_iter() {
            if !*ex {
                bbox = Some( match bbox {
                    None => PixelBox { min_row: row, max_row: row, min_col: col, max_col: col },
                    Some(b) => PixelBox {
                        min_row: b.min_row.min(row), max_row: b.max_row.max(row),
                        min_col: b.min_col.min(col), max_col: b.max_col.max(col)
                    }
                })
            }
        }
        bbox
    }

    /// the sub-mask for the given box (inclusive on both ends)
    pub fn crop (&self, bbox: &PixelBox)->Mask {
        let excluded = self.excluded.slice( s![ bbox.min_row..=bbox.max_row, bbox.min_col..=bbox.max_col ]).to_owned();
        Mask { excluded }
    }
}

/// reject polygons that are not clip-eligible (open, degenerate, non-finite or self-intersecting rings)
pub fn check_polygon (polygon: &Polygon<f64>)->Result<()> {
    let ring = polygon.exterior();
    if ring.0.len() < 4 {
        return Err( invalid_polygon( format!("exterior ring has only {} vertices", ring.0.len())))
    }
    if !ring.is_closed() {
        return Err( invalid_polygon("exterior ring is not closed"))
    }
    if polygon.coords_iter().any( |c| !(c.x.is_finite() && c.y.is_finite())) {
        return Err( invalid_polygon("non-finite vertex coordinates"))
    }
    if !polygon.is_valid() {
        return Err( invalid_polygon("polygon is not simple"))
    }
    Ok(())
}

/// rasterize `polygon` (in the CRS of `transform`) into a width x height mask
pub fn rasterize_mask (polygon: &Polygon<f64>, transform: &AffineTransform, width: usize, height: usize)->Result<Mask> {
    check_polygon( polygon)?;

    let mut excluded = vec![true; width * height];

    if width > 0 && height > 0 {
        if let Some((rows, cols)) = candidate_window( polygon, transform, width, height) {
            debug!("testing pixel centers in rows {rows:?}, cols {cols:?}");

            excluded.par_chunks_mut( width).enumerate()
                .filter( |(row,_)| rows.contains( row))
                .for_each( |(row, line)| {
                    for col in cols.clone() {
                        let (x,y) = transform.pixel_center( col, row);
                        line[col] = polygon.coordinate_position( &Coord { x, y }) == CoordPos::Outside;
                    }
                });
        }
    }

    let excluded = Array2::from_shape_vec( (height, width), excluded)
        .map_err( |e| invalid_polygon( format!("mask shape: {e}")))?;
    Ok( Mask { excluded } )
}

/// the (row,col) index ranges whose pixel centers can fall into the bounding rectangle of polygon.
/// We add one pixel of slack on each side to stay clear of rounding issues. Returns `None` if the
/// polygon lies completely outside of the grid
fn candidate_window (polygon: &Polygon<f64>, transform: &AffineTransform, width: usize, height: usize)
                     ->Option<(RangeInclusive<usize>,RangeInclusive<usize>)> {
    let full = Some( (0..=height-1, 0..=width-1));

    let rect = polygon.bounding_rect()?;
    let Some(inv) = transform.invert() else { return full };

    let (min, max) = (rect.min(), rect.max());
    let corners = [ (min.x,min.y), (max.x,min.y), (max.x,max.y), (min.x,max.y) ];
    let pixels: Vec<(f64,f64)> = corners.iter().map( |(x,y)| inv.apply( *x, *y)).collect(); // (col,row)

    let cols = index_range( pixels.iter().map( |p| p.0), width)?;
    let rows = index_range( pixels.iter().map( |p| p.1), height)?;
    Some( (rows, cols) )
}

fn index_range (vs: impl Iterator<Item=f64> + Clone, n: usize)->Option<RangeInclusive<usize>> {
    let v_min = vs.clone().fold( f64::INFINITY, f64::min);
    let v_max = vs.fold( f64::NEG_INFINITY, f64::max);

    let lo = ((v_min - 0.5).floor() - 1.0).max( 0.0);
    let hi = ((v_max - 0.5).ceil() + 1.0).min( (n - 1) as f64);

    if hi < lo { None } else { Some( lo as usize ..= hi as usize) }
}
