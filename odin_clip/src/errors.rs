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
use thiserror::Error;
use odin_gdal::errors::OdinGdalError;

pub type Result<T> = std::result::Result<T, ClipError>;

#[derive(Error,Debug)]
pub enum ClipError {

    #[error("query boundary not found: {0}")]
    BoundaryNotFound(String),

    #[error("query only resolved to a point, no area boundary: {0}")]
    PointBoundary(String),

    #[error("unrecognized CRS: {0}")]
    UnrecognizedCrs(String),

    #[error("reprojection failed: {0}")]
    Reprojection(String),

    #[error("cannot open raster: {0}")]
    RasterOpen(String),

    #[error("boundary validation failed: {0}")]
    BoundaryValidation(String),

    #[error("boundary not contained in image")]
    NotContained,

    #[error("invalid or self-intersecting boundary: {0}")]
    InvalidPolygon(String),

    #[error("clip region does not cover any pixel")]
    EmptyClipRegion,

    #[error("cannot write raster: {0}")]
    RasterWrite(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IOError( #[from] std::io::Error),

    // pass through for other OdinGdalErrors
    #[error("ODIN gdal error {0}")]
    OdinGdalError(OdinGdalError),
}

impl ClipError {
    /// true if this error was raised while resolving or validating the boundary, i.e. before any clipping
    /// took place. All failures yield no output but these are the ones an operator can fix by changing the query
    pub fn is_validation_failure (&self)->bool {
        use ClipError::*;
        matches!( self, BoundaryNotFound(_) | PointBoundary(_) | UnrecognizedCrs(_) | Reprojection(_) | BoundaryValidation(_) | NotContained)
    }
}

impl From<OdinGdalError> for ClipError {
    fn from (e: OdinGdalError)->Self {
        match e {
            OdinGdalError::UnrecognizedCrs(msg) => ClipError::UnrecognizedCrs(msg),
            OdinGdalError::ReprojectionError(msg) => ClipError::Reprojection(msg),
            OdinGdalError::RasterOpenError(msg) => ClipError::RasterOpen(msg),
            OdinGdalError::RasterWriteError(msg) => ClipError::RasterWrite(msg),
            OdinGdalError::IOError(e) => ClipError::IOError(e),
            other => ClipError::OdinGdalError(other)
        }
    }
}

pub fn boundary_not_found (query: impl ToString)->ClipError {
    ClipError::BoundaryNotFound(query.to_string())
}

pub fn invalid_polygon (msg: impl ToString)->ClipError {
    ClipError::InvalidPolygon(msg.to_string())
}

pub fn validation_error (msg: impl ToString)->ClipError {
    ClipError::BoundaryValidation(msg.to_string())
}

pub fn config_error (msg: impl ToString)->ClipError {
    ClipError::Config(msg.to_string())
}
