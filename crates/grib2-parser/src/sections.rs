//! GRIB2 section structures and parsers.
//!
//! A GRIB2 message is a sequence of length-prefixed sections between the
//! "GRIB" indicator and the "7777" end marker. Only the templates the public
//! forecast buckets actually use are decoded in full: lat/lon grids
//! (template 3.0), horizontal-level products (template 4.0) and simple
//! packing (template 5.0).

use chrono::{DateTime, NaiveDate, Utc};

use snap_common::{SnapError, SnapResult};

/// Section 0: Indicator (16 bytes).
#[derive(Debug, Clone)]
pub struct Indicator {
    pub discipline: u8,
    pub edition: u8,
    pub message_length: u64,
}

/// Section 1: Identification.
#[derive(Debug, Clone)]
pub struct Identification {
    pub center: u16,
    pub sub_center: u16,
    pub reference_time: DateTime<Utc>,
}

/// Section 3: Grid Definition (template 3.0, lat/lon).
#[derive(Debug, Clone)]
pub struct GridDefinition {
    pub template: u16,
    /// Points along a parallel (longitude direction).
    pub ni: u32,
    /// Points along a meridian (latitude direction).
    pub nj: u32,
    pub first_lat_microdeg: i32,
    pub first_lon_microdeg: i32,
    pub last_lat_microdeg: i32,
    pub last_lon_microdeg: i32,
    pub scanning_mode: u8,
}

/// Section 4: Product Definition (template 4.0).
#[derive(Debug, Clone)]
pub struct ProductDefinition {
    pub parameter_category: u8,
    pub parameter_number: u8,
    pub forecast_hour: u32,
    pub level_type: u8,
    pub level_value: u32,
}

/// Section 5: Data Representation.
#[derive(Debug, Clone)]
pub struct DataRepresentation {
    pub num_data_points: u32,
    pub template: u16,
    pub reference_value: f32,
    pub binary_scale_factor: i16,
    pub decimal_scale_factor: i16,
    pub bits_per_value: u8,
}

/// One raw section: number plus its body (header stripped).
#[derive(Debug)]
pub struct RawSection<'a> {
    pub number: u8,
    pub body: &'a [u8],
}

fn invalid(section: u8, reason: impl Into<String>) -> SnapError {
    SnapError::InvalidSection {
        section,
        reason: reason.into(),
    }
}

/// Parse Section 0 from the start of a message.
pub fn parse_indicator(data: &[u8]) -> SnapResult<Indicator> {
    if data.len() < 16 {
        return Err(SnapError::InvalidGrib2(
            "Not enough data for indicator section".to_string(),
        ));
    }
    if &data[0..4] != b"GRIB" {
        return Err(SnapError::InvalidGrib2("Missing GRIB magic".to_string()));
    }

    // Octet 7: discipline, octet 8: edition, octets 9-16: message length.
    let discipline = data[6];
    let edition = data[7];
    let message_length = u64::from_be_bytes([
        data[8], data[9], data[10], data[11], data[12], data[13], data[14], data[15],
    ]);

    if edition != 2 {
        return Err(SnapError::InvalidGrib2(format!(
            "Expected GRIB edition 2, got {}",
            edition
        )));
    }

    Ok(Indicator {
        discipline,
        edition,
        message_length,
    })
}

/// Split a message body (after Section 0, before "7777") into raw sections.
pub fn split_sections(body: &[u8]) -> SnapResult<Vec<RawSection<'_>>> {
    let mut sections = Vec::new();
    let mut offset = 0;

    while offset < body.len() {
        if body.len() - offset >= 4 && &body[offset..offset + 4] == b"7777" {
            return Ok(sections);
        }
        if body.len() - offset < 5 {
            return Err(SnapError::InvalidGrib2(
                "Truncated section header".to_string(),
            ));
        }

        let length = u32::from_be_bytes([
            body[offset],
            body[offset + 1],
            body[offset + 2],
            body[offset + 3],
        ]) as usize;
        let number = body[offset + 4];

        if length < 5 || offset + length > body.len() {
            return Err(invalid(number, format!("Bad section length {}", length)));
        }

        sections.push(RawSection {
            number,
            body: &body[offset + 5..offset + length],
        });
        offset += length;
    }

    Err(SnapError::InvalidGrib2(
        "Message ended without 7777 marker".to_string(),
    ))
}

/// Parse Section 1 from its body.
pub fn parse_identification(body: &[u8]) -> SnapResult<Identification> {
    if body.len() < 16 {
        return Err(invalid(1, "Not enough data"));
    }

    let center = u16::from_be_bytes([body[0], body[1]]);
    let sub_center = u16::from_be_bytes([body[2], body[3]]);

    let year = u16::from_be_bytes([body[7], body[8]]);
    let month = body[9];
    let day = body[10];
    let hour = body[11];
    let minute = body[12];
    let second = body[13];

    let reference_time = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .and_then(|d| d.and_hms_opt(hour as u32, minute as u32, second as u32))
        .ok_or_else(|| {
            invalid(
                1,
                format!(
                    "Invalid reference time {}-{:02}-{:02} {:02}:{:02}:{:02}",
                    year, month, day, hour, minute, second
                ),
            )
        })?;

    Ok(Identification {
        center,
        sub_center,
        reference_time: DateTime::<Utc>::from_naive_utc_and_offset(reference_time, Utc),
    })
}

/// Parse Section 3 from its body.
///
/// Template 3.0 (lat/lon) is decoded in full. Other grid templates keep the
/// template number only; decoding rejects them downstream.
pub fn parse_grid_definition(body: &[u8]) -> SnapResult<GridDefinition> {
    if body.len() < 9 {
        return Err(invalid(3, "Not enough data"));
    }

    // Body layout (header already stripped):
    //   [0]    source of grid definition
    //   [1-4]  number of data points
    //   [5]    octets for optional list
    //   [6]    interpretation of optional list
    //   [7-8]  grid definition template number
    //   [9..]  template data
    let template = u16::from_be_bytes([body[7], body[8]]);
    let gd = &body[9..];

    if template == 0 {
        // Template 3.0: Ni at 16, Nj at 20, La1/Lo1 at 32/36, La2/Lo2 at
        // 41/45, increments at 49/53, scanning mode at 57 (all microdegrees).
        if gd.len() < 58 {
            return Err(invalid(
                3,
                format!("Template 3.0 needs 58 bytes, got {}", gd.len()),
            ));
        }

        Ok(GridDefinition {
            template,
            ni: u32::from_be_bytes([gd[16], gd[17], gd[18], gd[19]]),
            nj: u32::from_be_bytes([gd[20], gd[21], gd[22], gd[23]]),
            first_lat_microdeg: i32::from_be_bytes([gd[32], gd[33], gd[34], gd[35]]),
            first_lon_microdeg: i32::from_be_bytes([gd[36], gd[37], gd[38], gd[39]]),
            last_lat_microdeg: i32::from_be_bytes([gd[41], gd[42], gd[43], gd[44]]),
            last_lon_microdeg: i32::from_be_bytes([gd[45], gd[46], gd[47], gd[48]]),
            scanning_mode: gd[57],
        })
    } else {
        // Unknown template: other grids place Ni/Nj at other offsets, so no
        // dimensions are guessed. Decoding rejects the message by template.
        Ok(GridDefinition {
            template,
            ni: 0,
            nj: 0,
            first_lat_microdeg: 0,
            first_lon_microdeg: 0,
            last_lat_microdeg: 0,
            last_lon_microdeg: 0,
            scanning_mode: 0,
        })
    }
}

/// Parse Section 4 from its body (template 4.0 layout).
pub fn parse_product_definition(body: &[u8]) -> SnapResult<ProductDefinition> {
    if body.len() < 23 {
        return Err(invalid(4, "Not enough data"));
    }

    // Body layout (header stripped):
    //   [0-1]   number of coordinate values
    //   [2-3]   product definition template number
    //   [4]     parameter category
    //   [5]     parameter number
    //   [13-16] forecast time
    //   [17]    type of first fixed surface
    //   [18]    scale factor of first fixed surface
    //   [19-22] scaled value of first fixed surface
    let parameter_category = body[4];
    let parameter_number = body[5];
    let forecast_hour = u32::from_be_bytes([body[13], body[14], body[15], body[16]]);
    let level_type = body[17];
    let scale_factor = body[18] as i8;
    let scaled_value = u32::from_be_bytes([body[19], body[20], body[21], body[22]]);

    // Near-surface levels use scale factor 0; apply positive factors so a
    // scaled "2 m" stays 2 m, and leave exotic encodings alone.
    let level_value = if scale_factor > 0 {
        scaled_value / 10u32.pow(scale_factor as u32)
    } else {
        scaled_value
    };

    Ok(ProductDefinition {
        parameter_category,
        parameter_number,
        forecast_hour,
        level_type,
        level_value,
    })
}

/// Parse Section 5 from its body.
pub fn parse_data_representation(body: &[u8]) -> SnapResult<DataRepresentation> {
    if body.len() < 6 {
        return Err(invalid(5, "Not enough data"));
    }

    // Body layout (header stripped):
    //   [0-3]  number of data points
    //   [4-5]  data representation template number
    //   [6..]  template data (5.0: reference f32, binary/decimal i16, bits u8)
    let num_data_points = u32::from_be_bytes([body[0], body[1], body[2], body[3]]);
    let template = u16::from_be_bytes([body[4], body[5]]);

    let td = &body[6..];
    let reference_value = if td.len() >= 4 {
        f32::from_be_bytes([td[0], td[1], td[2], td[3]])
    } else {
        0.0
    };
    let binary_scale_factor = if td.len() >= 6 {
        i16::from_be_bytes([td[4], td[5]])
    } else {
        0
    };
    let decimal_scale_factor = if td.len() >= 8 {
        i16::from_be_bytes([td[6], td[7]])
    } else {
        0
    };
    let bits_per_value = td.get(8).copied().unwrap_or(0);

    Ok(DataRepresentation {
        num_data_points,
        template,
        reference_value,
        binary_scale_factor,
        decimal_scale_factor,
        bits_per_value,
    })
}

/// Parse Section 6 from its body. Returns the bitmap bytes, or `None` when
/// indicator 255 says every grid point carries data.
pub fn parse_bitmap(body: &[u8]) -> SnapResult<Option<Vec<u8>>> {
    let indicator = *body.first().ok_or_else(|| invalid(6, "Empty section"))?;

    match indicator {
        255 => Ok(None),
        0 => Ok(Some(body[1..].to_vec())),
        other => Err(invalid(
            6,
            format!("Predefined bitmap {} not supported", other),
        )),
    }
}
