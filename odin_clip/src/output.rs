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

//! output file naming and per-session output directories

use std::{fs, path::{Path, PathBuf}, sync::atomic::{AtomicUsize, Ordering}};
use chrono::Local;
use tracing::{debug, info};

use crate::errors::Result;

pub const CROPPED_DIR: &str = "cropped";

/// append ".tif" to `path` unless it already ends with ".tif" or ".tiff" (case insensitive)
pub fn ensure_tif_extension (path: impl AsRef<Path>)->PathBuf {
    let path = path.as_ref();
    let is_tif = path.extension()
        .and_then( |ext| ext.to_str())
        .map( |ext| ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff"))
        .unwrap_or(false);

    if is_tif {
        path.to_path_buf()
    } else {
        let mut s = path.as_os_str().to_os_string();
        s.push(".tif");
        PathBuf::from(s)
    }
}

/// a unique, timestamped output directory (`<output_root>/YYYYmmdd_HHMMSS_<random>`) for the clips of one session.
/// Sessions are created explicitly and only removed through [`SessionDir::cleanup`]. Each session owns its
/// directory, i.e. sessions created within the same second do not share output files
#[derive(Debug)]
pub struct SessionDir {
    root: PathBuf,
    cropped: PathBuf,
    counter: AtomicUsize
}

impl SessionDir {
    pub fn create (output_root: impl AsRef<Path>)->Result<SessionDir> {
        let output_root = output_root.as_ref();
        fs::create_dir_all( output_root)?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S_").to_string();
        let root = tempfile::Builder::new().prefix( &stamp).tempdir_in( output_root)?.keep();
        let cropped = root.join( CROPPED_DIR);
        fs::create_dir( &cropped)?;
        info!("using session output dir {root:?}");

        Ok( SessionDir { root, cropped, counter: AtomicUsize::new(0) } )
    }

    pub fn root (&self)->&Path {
        &self.root
    }

    pub fn cropped_dir (&self)->&Path {
        &self.cropped
    }

    /// a pathname in the `cropped/` sub dir that does not exist yet. No file is created
    pub fn fresh_path (&self)->PathBuf {
        loop {
            let n = self.counter.fetch_add( 1, Ordering::Relaxed);
            let path = self.cropped.join( format!("clip_{n:04}.tif"));
            if !path.exists() {
                return path
            }
        }
    }

    /// the output pathname for a requested `output`: a fresh session path if empty,
    /// otherwise `output` with a guaranteed tif extension. Nothing is created on disk
    pub fn resolve_output (&self, output: &str)->PathBuf {
        if output.trim().is_empty() {
            self.fresh_path()
        } else {
            ensure_tif_extension( output)
        }
    }

    /// remove the session directory and everything in it
    pub fn cleanup (self)->Result<()> {
        if self.root.is_dir() {
            fs::remove_dir_all( &self.root)?;
            debug!("removed session output dir {:?}", self.root);
        }
        Ok(())
    }
}
