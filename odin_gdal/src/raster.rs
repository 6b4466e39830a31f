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

//! raster datasets as (bands,height,width) pixel buffers with georeferencing

use std::{fmt, path::{Path,PathBuf}};
use gdal::{Dataset, DatasetOptions, GdalOpenFlags};
use gdal::raster::{Buffer, GdalDataType, GdalType};
use geo::{LineString, Polygon};
use ndarray::{Array2, Array3, Axis};
use num::{NumCast, ToPrimitive, Zero};
use tracing::{debug,info,warn};

use crate::{affine::AffineTransform, crs::Crs, create_dataset, compress_create_opts, get_driver_from_filename, is_homogenous};
use crate::errors::{Result, misc_error, raster_open_error, raster_write_error, OdinGdalError};

/// numeric pixel element types we can read into and write from a [`RasterBuffer`]
pub trait RasterElement: GdalType + Copy + Zero + NumCast + PartialEq + fmt::Debug + Send + Sync + 'static {
    fn into_buffer (data: Array3<Self>)->RasterBuffer;
}

macro_rules! impl_raster_element {
    ( $( $t:ty => $variant:ident ),* ) => {
        $(
            impl RasterElement for $t {
                fn into_buffer (data: Array3<Self>)->RasterBuffer { RasterBuffer::$variant(data) }
            }
        )*
    }
}

impl_raster_element! {
    u8 => UInt8, i8 => Int8, u16 => UInt16, i16 => Int16, u32 => UInt32, i32 => Int32,
    u64 => UInt64, i64 => Int64, f32 => Float32, f64 => Float64
}

/// a multi-band pixel buffer of shape (bands,height,width) for one of the supported element types
#[derive(Debug,Clone,PartialEq)]
pub enum RasterBuffer {
    UInt8(Array3<u8>),
    Int8(Array3<i8>),
    UInt16(Array3<u16>),
    Int16(Array3<i16>),
    UInt32(Array3<u32>),
    Int32(Array3<i32>),
    UInt64(Array3<u64>),
    Int64(Array3<i64>),
    Float32(Array3<f32>),
    Float64(Array3<f64>),
}

/// run `$body` with `$data` bound to the typed `Array3` inside of a RasterBuffer (or a reference to it)
#[macro_export]
macro_rules! with_raster_buffer {
    ( $buf:expr, $data:ident => $body:expr ) => {
        match $buf {
            $crate::raster::RasterBuffer::UInt8($data) => $body,
            $crate::raster::RasterBuffer::Int8($data) => $body,
            $crate::raster::RasterBuffer::UInt16($data) => $body,
            $crate::raster::RasterBuffer::Int16($data) => $body,
            $crate::raster::RasterBuffer::UInt32($data) => $body,
            $crate::raster::RasterBuffer::Int32($data) => $body,
            $crate::raster::RasterBuffer::UInt64($data) => $body,
            $crate::raster::RasterBuffer::Int64($data) => $body,
            $crate::raster::RasterBuffer::Float32($data) => $body,
            $crate::raster::RasterBuffer::Float64($data) => $body,
        }
    }
}

impl RasterBuffer {
    /// promote a single band 2D (height,width) array into a 1-band buffer
    pub fn from_2d<T: RasterElement> (data: Array2<T>)->RasterBuffer {
        T::into_buffer( data.insert_axis( Axis(0)))
    }

    /// (bands,height,width)
    pub fn shape (&self)->(usize,usize,usize) {
        with_raster_buffer!( self, data => data.dim())
    }

    pub fn band_count (&self)->usize { self.shape().0 }

    pub fn data_type (&self)->GdalDataType {
        match self {
            RasterBuffer::UInt8(_) => GdalDataType::UInt8,
            RasterBuffer::Int8(_) => GdalDataType::Int8,
            RasterBuffer::UInt16(_) => GdalDataType::UInt16,
            RasterBuffer::Int16(_) => GdalDataType::Int16,
            RasterBuffer::UInt32(_) => GdalDataType::UInt32,
            RasterBuffer::Int32(_) => GdalDataType::Int32,
            RasterBuffer::UInt64(_) => GdalDataType::UInt64,
            RasterBuffer::Int64(_) => GdalDataType::Int64,
            RasterBuffer::Float32(_) => GdalDataType::Float32,
            RasterBuffer::Float64(_) => GdalDataType::Float64,
        }
    }

    /// pixel value of band/row/col as f64 (mostly for diagnostics and tests)
    pub fn value_f64 (&self, band: usize, row: usize, col: usize)->Option<f64> {
        with_raster_buffer!( self, data => data.get( (band,row,col)).and_then( |v| v.to_f64()))
    }
}

/// the element type we use to read a dataset: the common band type if all bands share a supported type,
/// Float64 otherwise
pub fn element_type_of (ds: &Dataset)->GdalDataType {
    use GdalDataType::*;

    if is_homogenous( ds) {
        if let Ok(band) = ds.rasterband(1) {
            let band_type = band.band_type();
            return match band_type {
                UInt8 | Int8 | UInt16 | Int16 | UInt32 | Int32 | UInt64 | Int64 | Float32 | Float64 => band_type,
                _ => Float64
            }
        }
    }
    Float64
}

/* #region metadata *******************************************************************************************/

/// shape, georeferencing and element type of a raster
#[derive(Debug,Clone)]
pub struct RasterMeta {
    pub path: PathBuf,
    pub width: usize,
    pub height: usize,
    pub band_count: usize,
    pub transform: AffineTransform,
    pub crs: Crs,
    pub element_type: GdalDataType,
    /// nodata value per band (index 0 is band 1)
    pub nodata: Vec<Option<f64>>
}

impl RasterMeta {
    /// the raster footprint in its own CRS as a closed rectangle with vertex order
    /// (xmin,ymin) -> (xmax,ymin) -> (xmax,ymax) -> (xmin,ymax) -> (xmin,ymin)
    pub fn bounds_polygon (&self)->Polygon<f64> {
        let corners = self.transform.grid_corners( self.width, self.height);

        let x_min = corners.iter().map( |c| c.0).fold( f64::INFINITY, f64::min);
        let x_max = corners.iter().map( |c| c.0).fold( f64::NEG_INFINITY, f64::max);
        let y_min = corners.iter().map( |c| c.1).fold( f64::INFINITY, f64::min);
        let y_max = corners.iter().map( |c| c.1).fold( f64::NEG_INFINITY, f64::max);

        Polygon::new(
            LineString::from( vec![ (x_min,y_min), (x_max,y_min), (x_max,y_max), (x_min,y_max), (x_min,y_min) ]),
            vec![]
        )
    }

    /// nodata value of the first band
    pub fn nodata (&self)->Option<f64> {
        self.nodata.first().copied().flatten()
    }
}

/// open the raster at `path`, read its metadata and release it again
pub fn read_raster_meta (path: impl AsRef<Path>)->Result<RasterMeta> {
    let src = RasterSource::open( path)?;
    let meta = src.meta().clone();
    src.release();
    Ok(meta)
}

/* #endregion metadata */

/* #region read access ******************************************************************************************/

/// a read-only raster dataset that is exclusively owned by the operation that opened it.
/// Use [`RasterSource::release`] to close it explicitly (dropping it closes it as well but does not report errors)
pub struct RasterSource {
    ds: Dataset,
    meta: RasterMeta
}

impl RasterSource {
    pub fn open (path: impl AsRef<Path>)->Result<RasterSource> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err( raster_open_error( format!("no such file {path:?}")))
        }

        let dso = DatasetOptions {
            open_flags: GdalOpenFlags::GDAL_OF_RASTER | GdalOpenFlags::GDAL_OF_READONLY,
            allowed_drivers: None,
            open_options: None,
            sibling_files: None
        };
        let ds = Dataset::open_ex( path, dso).map_err( |e| raster_open_error( format!("{path:?}: {e}")))?;
        let meta = read_meta( &ds, path)?;
        debug!("opened raster {:?} ({}x{}x{} {:?})", path, meta.band_count, meta.height, meta.width, meta.element_type);

        Ok( RasterSource { ds, meta } )
    }

    pub fn meta (&self)->&RasterMeta {
        &self.meta
    }

    pub fn dataset (&self)->&Dataset {
        &self.ds
    }

    /// read all bands for the whole grid
    pub fn read_buffer (&self)->Result<RasterBuffer> {
        self.read_window( 0, 0, self.meta.width, self.meta.height)
    }

    /// read all bands for the given pixel window, using the element type of the dataset
    pub fn read_window (&self, col_off: usize, row_off: usize, width: usize, height: usize)->Result<RasterBuffer> {
        if width == 0 || height == 0 || col_off + width > self.meta.width || row_off + height > self.meta.height {
            return Err( misc_error( format!("window ({col_off},{row_off}) {width}x{height} outside of {}x{} grid", self.meta.width, self.meta.height)))
        }

        let ds = &self.ds;
        let win = (col_off, row_off, width, height);

        use GdalDataType::*;
        let buf = match self.meta.element_type {
            UInt8   => RasterBuffer::UInt8( read_bands::<u8>( ds, win)?),
            Int8    => RasterBuffer::Int8( read_bands::<i8>( ds, win)?),
            UInt16  => RasterBuffer::UInt16( read_bands::<u16>( ds, win)?),
            Int16   => RasterBuffer::Int16( read_bands::<i16>( ds, win)?),
            UInt32  => RasterBuffer::UInt32( read_bands::<u32>( ds, win)?),
            Int32   => RasterBuffer::Int32( read_bands::<i32>( ds, win)?),
            UInt64  => RasterBuffer::UInt64( read_bands::<u64>( ds, win)?),
            Int64   => RasterBuffer::Int64( read_bands::<i64>( ds, win)?),
            Float32 => RasterBuffer::Float32( read_bands::<f32>( ds, win)?),
            _       => RasterBuffer::Float64( read_bands::<f64>( ds, win)?),
        };
        Ok(buf)
    }

    /// read the whole raster into memory, including its georeferencing
    pub fn read_geo_raster (&self)->Result<GeoRaster> {
        Ok( GeoRaster {
            buffer: self.read_buffer()?,
            transform: self.meta.transform,
            crs: self.meta.crs.clone(),
            nodata: self.meta.nodata.clone()
        })
    }

    /// close the underlying dataset. A failure to do so is logged but not escalated
    pub fn release (self) {
        let RasterSource { ds, meta } = self;
        match ds.close() {
            Ok(_) => debug!("released raster {:?}", meta.path),
            Err(e) => warn!("failed to release raster {:?}: {e}", meta.path)
        }
    }
}

fn read_meta (ds: &Dataset, path: &Path)->Result<RasterMeta> {
    let (width, height) = ds.raster_size();
    let band_count = ds.raster_count();
    if band_count == 0 || width == 0 || height == 0 {
        return Err( raster_open_error( format!("{path:?} has no raster data")))
    }

    let gt = ds.geo_transform().map_err( |_| raster_open_error( format!("{path:?} is not georeferenced")))?;
    let transform = AffineTransform::from_gdal( &gt);
    if !transform.is_invertible() {
        return Err( raster_open_error( format!("{path:?} has a singular geotransform {gt:?}")))
    }

    let mut srs = ds.spatial_ref().map_err( |_| raster_open_error( format!("{path:?} has no spatial reference")))?;
    let crs = Crs::from_spatial_ref( &mut srs)?;

    let mut nodata: Vec<Option<f64>> = Vec::with_capacity( band_count);
    for k in 1..=band_count {
        nodata.push( ds.rasterband(k)?.no_data_value());
    }

    Ok( RasterMeta {
        path: path.to_path_buf(),
        width, height, band_count,
        transform, crs,
        element_type: element_type_of( ds),
        nodata
    })
}

fn read_bands<T: RasterElement> (ds: &Dataset, win: (usize,usize,usize,usize))->Result<Array3<T>> {
    let (col_off, row_off, width, height) = win;
    let n_bands = ds.raster_count();
    let mut data: Vec<T> = Vec::with_capacity( n_bands * width * height);

    for k in 1..=n_bands {
        let band = ds.rasterband(k)?;
        let buf: Buffer<T> = band.read_as( (col_off as isize, row_off as isize), (width,height), (width,height), None)?;
        data.extend_from_slice( buf.data());
    }

    Array3::from_shape_vec( (n_bands, height, width), data).map_err( |e| misc_error(e))
}

/* #endregion read access */

/* #region write access *****************************************************************************************/

/// an in-memory raster with georeferencing, ready to be serialized
#[derive(Debug,Clone)]
pub struct GeoRaster {
    pub buffer: RasterBuffer,
    pub transform: AffineTransform,
    pub crs: Crs,
    /// nodata value per band, written to the output bands if set
    pub nodata: Vec<Option<f64>>
}

impl GeoRaster {
    /// read a complete raster file into memory
    pub fn read (path: impl AsRef<Path>)->Result<GeoRaster> {
        let src = RasterSource::open( path)?;
        let res = src.read_geo_raster();
        src.release();
        res
    }

    /// (bands,height,width)
    pub fn shape (&self)->(usize,usize,usize) {
        self.buffer.shape()
    }

    /// write buffer, transform, CRS and nodata values to a new file at `path`, using the driver associated
    /// with the file extension. Element type and band count are preserved.
    /// If writing fails no (partial) file is left behind
    pub fn write (&self, path: impl AsRef<Path>, compress: bool)->Result<()> {
        let path = path.as_ref();

        let res = self.write_dataset( path, compress);
        if res.is_err() {
            if path.exists() {
                if let Err(e) = std::fs::remove_file( path) {
                    warn!("failed to remove incomplete output {path:?}: {e}");
                }
            }
        } else {
            info!("raster written to {path:?}");
        }

        res.map_err( |e| match e {
            OdinGdalError::RasterWriteError(_) => e,
            other => raster_write_error( format!("{path:?}: {other}"))
        })
    }

    fn write_dataset (&self, path: &Path, compress: bool)->Result<()> {
        let fname = path.to_string_lossy().to_lowercase();
        let driver = get_driver_from_filename( &fname)
            .ok_or_else( || raster_write_error( format!("no raster driver for output {path:?}")))?;

        let (n_bands, height, width) = self.buffer.shape();
        let data_type = self.buffer.data_type();
        let co = if compress { Some( compress_create_opts( data_type)?) } else { None };

        let mut ds = create_dataset( &driver, path, width, height, n_bands, data_type, co)?;
        ds.set_geo_transform( &self.transform.to_gdal())?;
        ds.set_spatial_ref( &self.crs.spatial_ref()?)?;

        with_raster_buffer!( &self.buffer, data => write_bands( &mut ds, data, &self.nodata))?;

        ds.flush_cache()?;
        ds.close()?;
        Ok(())
    }
}

fn write_bands<T: RasterElement> (ds: &mut Dataset, data: &Array3<T>, nodata: &[Option<f64>])->Result<()> {
    let (n_bands, height, width) = data.dim();

    for k in 0..n_bands {
        let mut band = ds.rasterband(k+1)?;
        if let Some(nd) = nodata.get(k).copied().flatten() {
            band.set_no_data_value( Some(nd))?;
        }

        let values: Vec<T> = data.index_axis( Axis(0), k).iter().copied().collect();
        let mut buf = Buffer::new( (width,height), values);
        band.write( (0,0), (width,height), &mut buf)?;
    }

    Ok(())
}

/* #endregion write access */
