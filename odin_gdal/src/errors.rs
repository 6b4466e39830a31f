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
use gdal::errors::GdalError;

pub type Result<T> = std::result::Result<T, OdinGdalError>;

#[derive(Error,Debug)]
pub enum OdinGdalError {

    #[error("unrecognized CRS: {0}")]
    UnrecognizedCrs(String),

    #[error("reprojection failed: {0}")]
    ReprojectionError(String),

    #[error("cannot open raster: {0}")]
    RasterOpenError(String),

    #[error("cannot write raster: {0}")]
    RasterWriteError(String),

    // pass through for errors reported by the gdal crate
    #[error("GDAL error: {0}")]
    GdalError( #[from] GdalError),

    #[error("IO error: {0}")]
    IOError( #[from] std::io::Error),

    // generic self-created error
    #[error("operation failed: {0}")]
    MiscError(String),
}

pub fn misc_error (msg: impl ToString)->OdinGdalError {
    OdinGdalError::MiscError(msg.to_string())
}

pub fn unrecognized_crs (descr: impl ToString)->OdinGdalError {
    OdinGdalError::UnrecognizedCrs(descr.to_string())
}

pub fn reprojection_error (msg: impl ToString)->OdinGdalError {
    OdinGdalError::ReprojectionError(msg.to_string())
}

pub fn raster_open_error (msg: impl ToString)->OdinGdalError {
    OdinGdalError::RasterOpenError(msg.to_string())
}

pub fn raster_write_error (msg: impl ToString)->OdinGdalError {
    OdinGdalError::RasterWriteError(msg.to_string())
}

