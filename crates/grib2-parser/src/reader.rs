//! Message-level reading of GRIB2 files.

use bytes::Bytes;

use snap_common::{SnapError, SnapResult};

use crate::sections::{
    parse_bitmap, parse_data_representation, parse_grid_definition, parse_identification,
    parse_indicator, parse_product_definition, split_sections, DataRepresentation, GridDefinition,
    Identification, Indicator, ProductDefinition,
};
use crate::tables;
use crate::unpack::unpack_simple;

/// A fully framed GRIB2 message with its packed data still undecoded.
#[derive(Debug, Clone)]
pub struct Grib2Message {
    pub indicator: Indicator,
    pub identification: Identification,
    pub grid: GridDefinition,
    pub product: ProductDefinition,
    pub representation: DataRepresentation,
    pub bitmap: Option<Vec<u8>>,
    pub data: Bytes,
}

impl Grib2Message {
    /// WMO short name of the parameter, e.g. "TMP".
    pub fn short_name(&self) -> String {
        tables::parameter_short_name(
            self.indicator.discipline,
            self.product.parameter_category,
            self.product.parameter_number,
        )
    }

    /// Description of the first fixed surface, e.g. "2 m above ground".
    pub fn level_description(&self) -> String {
        tables::level_description(self.product.level_type, self.product.level_value)
    }

    /// Whether the message sits at a near-surface level.
    pub fn is_near_surface(&self) -> bool {
        tables::is_near_surface(self.product.level_type, self.product.level_value)
    }

    /// Grid dimensions as (rows, columns).
    pub fn grid_dims(&self) -> (u32, u32) {
        (self.grid.nj, self.grid.ni)
    }

    /// Decode the packed data into row-major values, NaN for masked points.
    ///
    /// Fails with `UnsupportedGrid` for anything other than a lat/lon grid
    /// (template 3.0) and `UnsupportedPacking` for anything other than
    /// simple packing (template 5.0).
    pub fn decode_values(&self) -> SnapResult<Vec<f32>> {
        if self.grid.template != 0 {
            return Err(SnapError::UnsupportedGrid {
                template: self.grid.template,
            });
        }
        if self.representation.template != 0 {
            return Err(SnapError::UnsupportedPacking {
                template: self.representation.template,
            });
        }

        let values = unpack_simple(
            &self.data,
            self.representation.num_data_points,
            self.representation.bits_per_value,
            self.representation.reference_value,
            self.representation.binary_scale_factor,
            self.representation.decimal_scale_factor,
            self.bitmap.as_deref(),
        )?;

        Ok(values
            .into_iter()
            .map(|v| v.unwrap_or(f32::NAN))
            .collect())
    }
}

/// Iterator-style reader over the messages in a GRIB2 byte stream.
pub struct Grib2Reader {
    data: Bytes,
    offset: usize,
}

impl Grib2Reader {
    pub fn new(data: Bytes) -> Self {
        Self { data, offset: 0 }
    }

    /// Parse the next message, or `None` at end of input.
    pub fn next_message(&mut self) -> SnapResult<Option<Grib2Message>> {
        // Tolerate trailing padding after the last message.
        if self.data.len() - self.offset.min(self.data.len()) < 16 {
            return Ok(None);
        }

        let remaining = &self.data[self.offset..];
        let indicator = parse_indicator(remaining)?;

        let total = indicator.message_length as usize;
        if total < 20 || total > remaining.len() {
            return Err(SnapError::InvalidGrib2(format!(
                "Message length {} exceeds remaining {} bytes",
                total,
                remaining.len()
            )));
        }

        let message = &remaining[..total];
        let sections = split_sections(&message[16..])?;

        let mut identification = None;
        let mut grid = None;
        let mut product = None;
        let mut representation = None;
        let mut bitmap = None;
        let mut data = None;

        for section in &sections {
            match section.number {
                1 => identification = Some(parse_identification(section.body)?),
                2 => {} // Local use, skipped
                3 => grid = Some(parse_grid_definition(section.body)?),
                4 => product = Some(parse_product_definition(section.body)?),
                5 => representation = Some(parse_data_representation(section.body)?),
                6 => bitmap = parse_bitmap(section.body)?,
                7 => data = Some(Bytes::copy_from_slice(section.body)),
                other => {
                    return Err(SnapError::InvalidGrib2(format!(
                        "Unexpected section number {}",
                        other
                    )))
                }
            }
        }

        let missing =
            |name: &str| SnapError::InvalidGrib2(format!("Message missing section {}", name));

        let message = Grib2Message {
            indicator,
            identification: identification.ok_or_else(|| missing("1"))?,
            grid: grid.ok_or_else(|| missing("3"))?,
            product: product.ok_or_else(|| missing("4"))?,
            representation: representation.ok_or_else(|| missing("5"))?,
            bitmap,
            data: data.ok_or_else(|| missing("7"))?,
        };

        self.offset += total;
        Ok(Some(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::Grib2MessageBuilder;

    #[test]
    fn test_parse_single_message() {
        let bytes = Grib2MessageBuilder::temperature_2m()
            .with_grid(5, 4)
            .with_constant_value(288.15)
            .build();

        let mut reader = Grib2Reader::new(Bytes::from(bytes));
        let msg = reader.next_message().unwrap().unwrap();

        assert_eq!(msg.short_name(), "TMP");
        assert_eq!(msg.level_description(), "2 m above ground");
        assert_eq!(msg.grid_dims(), (4, 5));
        assert!(msg.is_near_surface());

        assert!(reader.next_message().unwrap().is_none());
    }

    #[test]
    fn test_parse_concatenated_messages() {
        let mut bytes = Grib2MessageBuilder::temperature_2m().build();
        bytes.extend(Grib2MessageBuilder::wind_u_10m().build());
        bytes.extend(Grib2MessageBuilder::wind_v_10m().build());

        let mut reader = Grib2Reader::new(Bytes::from(bytes));
        let names: Vec<String> = std::iter::from_fn(|| {
            reader.next_message().unwrap().map(|m| m.short_name())
        })
        .collect();

        assert_eq!(names, vec!["TMP", "UGRD", "VGRD"]);
    }

    #[test]
    fn test_decode_gradient_values() {
        let bytes = Grib2MessageBuilder::temperature_2m()
            .with_grid(10, 1)
            .with_gradient(260.0, 300.0)
            .build();

        let mut reader = Grib2Reader::new(Bytes::from(bytes));
        let msg = reader.next_message().unwrap().unwrap();
        let values = msg.decode_values().unwrap();

        assert_eq!(values.len(), 10);
        // 16-bit packing quantizes, so allow some slack.
        assert!((values[0] - 260.0).abs() < 0.5);
        assert!((values[9] - 296.0).abs() < 0.5);
        for w in values.windows(2) {
            assert!(w[1] >= w[0], "gradient should be monotonic");
        }
    }

    #[test]
    fn test_ccsds_packed_message_is_typed_error() {
        // ECMWF AIFS publishes CCSDS-packed data (template 5.42)
        let bytes = Grib2MessageBuilder::temperature_2m()
            .with_representation_template(42)
            .build();

        let mut reader = Grib2Reader::new(Bytes::from(bytes));
        let msg = reader.next_message().unwrap().unwrap();

        let err = msg.decode_values().unwrap_err();
        assert!(matches!(err, SnapError::UnsupportedPacking { template: 42 }));
    }

    #[test]
    fn test_unknown_grid_template_is_typed_error() {
        // Gaussian grid (template 3.40): framing still parses, decoding refuses
        let bytes = Grib2MessageBuilder::temperature_2m()
            .with_grid_template(40)
            .build();

        let mut reader = Grib2Reader::new(Bytes::from(bytes));
        let msg = reader.next_message().unwrap().unwrap();

        let err = msg.decode_values().unwrap_err();
        assert!(matches!(err, SnapError::UnsupportedGrid { template: 40 }));
    }

    #[test]
    fn test_garbage_input_is_error_not_panic() {
        let mut reader = Grib2Reader::new(Bytes::from_static(b"not a grib file at all.."));
        assert!(reader.next_message().is_err());
    }

    #[test]
    fn test_truncated_input_yields_none() {
        let mut reader = Grib2Reader::new(Bytes::from_static(b"GRIB"));
        assert!(reader.next_message().unwrap().is_none());
    }
}
