//! Synthetic GRIB2 message builder.
//!
//! Emits structurally valid single-message GRIB2 byte streams (lat/lon grid
//! template 3.0, product template 4.0, 16-bit simple packing) so parser and
//! pipeline tests don't need real forecast downloads. Concatenate the output
//! of several builders to simulate a multi-message file.

/// Builder for one synthetic GRIB2 message.
pub struct Grib2MessageBuilder {
    discipline: u8,
    center: u16,
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    // Grid (template 3.0)
    grid_template: u16,
    ni: u32,
    nj: u32,
    first_lat_microdeg: i32,
    first_lon_microdeg: i32,
    increment_microdeg: u32,
    // Product (template 4.0)
    param_category: u8,
    param_number: u8,
    level_type: u8,
    level_value: u32,
    forecast_hour: u32,
    // Data representation (template 5.0)
    representation_template: u16,
    values: Vec<f32>,
}

impl Default for Grib2MessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Grib2MessageBuilder {
    /// Generic meteorological message on a 10x10 one-degree grid.
    pub fn new() -> Self {
        let ni = 10;
        let nj = 10;
        Self {
            discipline: 0,
            center: 7, // NCEP
            year: 2024,
            month: 2,
            day: 5,
            hour: 0,
            grid_template: 0,
            ni,
            nj,
            first_lat_microdeg: 45_000_000,
            first_lon_microdeg: 230_000_000,
            increment_microdeg: 1_000_000,
            param_category: 0,
            param_number: 0,
            level_type: 103,
            level_value: 2,
            forecast_hour: 6,
            representation_template: 0,
            values: vec![288.15; (ni * nj) as usize],
        }
    }

    /// 2 m temperature (TMP at 2 m above ground).
    pub fn temperature_2m() -> Self {
        Self::new().with_parameter(0, 0).with_level(103, 2)
    }

    /// 10 m u-component of wind (UGRD).
    pub fn wind_u_10m() -> Self {
        Self::new().with_parameter(2, 2).with_level(103, 10)
    }

    /// 10 m v-component of wind (VGRD).
    pub fn wind_v_10m() -> Self {
        Self::new().with_parameter(2, 3).with_level(103, 10)
    }

    pub fn with_parameter(mut self, category: u8, number: u8) -> Self {
        self.param_category = category;
        self.param_number = number;
        self
    }

    pub fn with_level(mut self, level_type: u8, level_value: u32) -> Self {
        self.level_type = level_type;
        self.level_value = level_value;
        self
    }

    pub fn with_grid(mut self, ni: u32, nj: u32) -> Self {
        self.ni = ni;
        self.nj = nj;
        self.values = vec![0.0; (ni * nj) as usize];
        self
    }

    pub fn with_forecast_hour(mut self, hour: u32) -> Self {
        self.forecast_hour = hour;
        self
    }

    /// Declare a different grid definition template number. The section body
    /// keeps the lat/lon layout; only the declared template changes.
    pub fn with_grid_template(mut self, template: u16) -> Self {
        self.grid_template = template;
        self
    }

    /// Declare a different data representation template number. The payload
    /// stays simple-packed; only the declared template changes.
    pub fn with_representation_template(mut self, template: u16) -> Self {
        self.representation_template = template;
        self
    }

    pub fn with_reference_time(mut self, year: u16, month: u8, day: u8, hour: u8) -> Self {
        self.year = year;
        self.month = month;
        self.day = day;
        self.hour = hour;
        self
    }

    pub fn with_constant_value(mut self, value: f32) -> Self {
        self.values = vec![value; (self.ni * self.nj) as usize];
        self
    }

    /// Linear ramp from `min` to `max` across the grid in row-major order.
    pub fn with_gradient(mut self, min: f32, max: f32) -> Self {
        let n = (self.ni * self.nj) as usize;
        self.values = (0..n)
            .map(|i| min + (max - min) * (i as f32 / n as f32))
            .collect();
        self
    }

    pub fn with_values(mut self, values: Vec<f32>) -> Self {
        assert_eq!(values.len(), (self.ni * self.nj) as usize);
        self.values = values;
        self
    }

    /// Serialize the message.
    pub fn build(&self) -> Vec<u8> {
        let section1 = self.section1();
        let section3 = self.section3();
        let section4 = self.section4();
        let section5 = self.section5();
        let section6 = self.section6();
        let section7 = self.section7();

        let total = 16
            + section1.len()
            + section3.len()
            + section4.len()
            + section5.len()
            + section6.len()
            + section7.len()
            + 4;

        let mut message = Vec::with_capacity(total);

        // Section 0: indicator
        message.extend_from_slice(b"GRIB");
        message.extend_from_slice(&[0, 0]);
        message.push(self.discipline);
        message.push(2); // edition
        message.extend_from_slice(&(total as u64).to_be_bytes());

        message.extend_from_slice(&section1);
        message.extend_from_slice(&section3);
        message.extend_from_slice(&section4);
        message.extend_from_slice(&section5);
        message.extend_from_slice(&section6);
        message.extend_from_slice(&section7);

        message.extend_from_slice(b"7777");
        message
    }

    fn section1(&self) -> Vec<u8> {
        let mut s = Vec::new();
        s.extend_from_slice(&21u32.to_be_bytes());
        s.push(1);

        s.extend_from_slice(&self.center.to_be_bytes());
        s.extend_from_slice(&0u16.to_be_bytes()); // sub-center
        s.push(2); // master table version
        s.push(1); // local table version
        s.push(1); // significance: start of forecast
        s.extend_from_slice(&self.year.to_be_bytes());
        s.push(self.month);
        s.push(self.day);
        s.push(self.hour);
        s.push(0); // minute
        s.push(0); // second
        s.push(0); // production status: operational
        s.push(1); // data type: forecast
        s
    }

    fn section3(&self) -> Vec<u8> {
        let mut s = Vec::new();
        s.extend_from_slice(&(14u32 + 58).to_be_bytes());
        s.push(3);

        s.push(0); // source of grid definition
        s.extend_from_slice(&(self.ni * self.nj).to_be_bytes());
        s.push(0); // octets for optional list
        s.push(0); // interpretation
        s.extend_from_slice(&self.grid_template.to_be_bytes());

        // Template 3.0 (58 bytes)
        s.push(6); // shape of Earth: sphere r=6371229m
        s.push(0);
        s.extend_from_slice(&0u32.to_be_bytes());
        s.push(0);
        s.extend_from_slice(&0u32.to_be_bytes());
        s.push(0);
        s.extend_from_slice(&0u32.to_be_bytes());

        s.extend_from_slice(&self.ni.to_be_bytes());
        s.extend_from_slice(&self.nj.to_be_bytes());
        s.extend_from_slice(&0u32.to_be_bytes()); // basic angle
        s.extend_from_slice(&0xFFFF_FFFFu32.to_be_bytes()); // subdivisions

        let last_lat =
            self.first_lat_microdeg - ((self.nj - 1) * self.increment_microdeg) as i32;
        let last_lon =
            self.first_lon_microdeg + ((self.ni - 1) * self.increment_microdeg) as i32;

        s.extend_from_slice(&self.first_lat_microdeg.to_be_bytes());
        s.extend_from_slice(&self.first_lon_microdeg.to_be_bytes());
        s.push(48); // resolution/component flags
        s.extend_from_slice(&last_lat.to_be_bytes());
        s.extend_from_slice(&last_lon.to_be_bytes());
        s.extend_from_slice(&self.increment_microdeg.to_be_bytes());
        s.extend_from_slice(&self.increment_microdeg.to_be_bytes());
        s.push(0b0100_0000); // scanning mode: +i, -j
        s
    }

    fn section4(&self) -> Vec<u8> {
        let mut s = Vec::new();
        s.extend_from_slice(&34u32.to_be_bytes());
        s.push(4);

        s.extend_from_slice(&0u16.to_be_bytes()); // coordinate values
        s.extend_from_slice(&0u16.to_be_bytes()); // template 4.0
        s.push(self.param_category);
        s.push(self.param_number);
        s.push(2); // generating process: forecast
        s.push(0);
        s.push(0);
        s.extend_from_slice(&0u16.to_be_bytes()); // cutoff hours
        s.push(0); // cutoff minutes
        s.push(1); // time unit: hours
        s.extend_from_slice(&self.forecast_hour.to_be_bytes());

        s.push(self.level_type);
        s.push(0); // scale factor
        s.extend_from_slice(&self.level_value.to_be_bytes());

        s.push(255); // no second fixed surface
        s.push(0);
        s.extend_from_slice(&0u32.to_be_bytes());
        s
    }

    fn packing(&self) -> (f32, i16, u8) {
        let (min, max) = self
            .values
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let range = max - min;

        if range == 0.0 {
            (min, 0, 0)
        } else {
            // 16-bit packing: choose E so the range fits in 65535 steps.
            let e = (range / 65535.0).log2().ceil() as i16;
            (min, e, 16)
        }
    }

    fn section5(&self) -> Vec<u8> {
        let (reference, binary_scale, bits) = self.packing();

        let mut s = Vec::new();
        s.extend_from_slice(&21u32.to_be_bytes());
        s.push(5);

        s.extend_from_slice(&(self.ni * self.nj).to_be_bytes());
        s.extend_from_slice(&self.representation_template.to_be_bytes());
        s.extend_from_slice(&reference.to_be_bytes());
        s.extend_from_slice(&binary_scale.to_be_bytes());
        s.extend_from_slice(&0i16.to_be_bytes()); // decimal scale
        s.push(bits);
        s.push(0); // original type: float
        s
    }

    fn section6(&self) -> Vec<u8> {
        let mut s = Vec::new();
        s.extend_from_slice(&6u32.to_be_bytes());
        s.push(6);
        s.push(255); // no bitmap
        s
    }

    fn section7(&self) -> Vec<u8> {
        let (reference, binary_scale, bits) = self.packing();

        let mut packed = Vec::new();
        if bits > 0 {
            let scale = 2.0_f32.powi(binary_scale as i32);
            for &v in &self.values {
                let q = ((v - reference) / scale).round() as u16;
                packed.extend_from_slice(&q.to_be_bytes());
            }
        }

        let mut s = Vec::new();
        s.extend_from_slice(&(5 + packed.len() as u32).to_be_bytes());
        s.push(7);
        s.extend_from_slice(&packed);
        s
    }
}
