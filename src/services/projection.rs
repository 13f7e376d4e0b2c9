use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Constants of a Lambert conformal conic grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LambertGrid {
    /// Earth radius in km.
    pub earth_radius: f64,
    /// Grid spacing in km.
    pub grid_spacing: f64,
    pub standard_parallel_1: f64,
    pub standard_parallel_2: f64,
    pub origin_longitude: f64,
    pub origin_latitude: f64,
    pub origin_x: f64,
    pub origin_y: f64,
}

/// The Korean 5 km grid.
pub const KOREA_GRID: LambertGrid = LambertGrid {
    earth_radius: 6371.00877,
    grid_spacing: 5.0,
    standard_parallel_1: 30.0,
    standard_parallel_2: 60.0,
    origin_longitude: 126.0,
    origin_latitude: 38.0,
    origin_x: 43.0,
    origin_y: 136.0,
};

struct ConeTerms {
    re: f64,
    sn: f64,
    sf: f64,
    ro: f64,
    olon: f64,
}

impl LambertGrid {
    fn cone_terms(&self) -> ConeTerms {
        let re = self.earth_radius / self.grid_spacing;
        let slat1 = self.standard_parallel_1.to_radians();
        let slat2 = self.standard_parallel_2.to_radians();
        let olat = self.origin_latitude.to_radians();

        let sn = (slat1.cos() / slat2.cos()).ln()
            / ((FRAC_PI_4 + slat2 * 0.5).tan() / (FRAC_PI_4 + slat1 * 0.5).tan()).ln();
        let sf = (FRAC_PI_4 + slat1 * 0.5).tan().powf(sn) * slat1.cos() / sn;
        let ro = re * sf / (FRAC_PI_4 + olat * 0.5).tan().powf(sn);

        ConeTerms {
            re,
            sn,
            sf,
            ro,
            olon: self.origin_longitude.to_radians(),
        }
    }

    /// Inverse projection: grid `(x, y)` to `(latitude, longitude)` in degrees.
    pub fn to_wgs84(&self, x: f64, y: f64) -> (f64, f64) {
        let t = self.cone_terms();
        let xn = x - self.origin_x;
        let yn = t.ro - y + self.origin_y;

        let mut ra = (xn * xn + yn * yn).sqrt();
        if t.sn < 0.0 {
            ra = -ra;
        }
        let alat = 2.0 * (t.re * t.sf / ra).powf(1.0 / t.sn).atan() - FRAC_PI_2;

        let theta = if xn.abs() <= f64::EPSILON {
            0.0
        } else if yn.abs() <= f64::EPSILON {
            if xn < 0.0 {
                -FRAC_PI_2
            } else {
                FRAC_PI_2
            }
        } else {
            xn.atan2(yn)
        };
        let alon = theta / t.sn + t.olon;

        (alat.to_degrees(), alon.to_degrees())
    }

    /// Forward projection: `(latitude, longitude)` in degrees to grid `(x, y)`.
    pub fn from_wgs84(&self, latitude: f64, longitude: f64) -> (f64, f64) {
        let t = self.cone_terms();
        let ra = t.re * t.sf / (FRAC_PI_4 + latitude.to_radians() * 0.5).tan().powf(t.sn);

        let mut theta = longitude.to_radians() - t.olon;
        if theta > PI {
            theta -= 2.0 * PI;
        }
        if theta < -PI {
            theta += 2.0 * PI;
        }
        theta *= t.sn;

        (
            ra * theta.sin() + self.origin_x,
            t.ro - ra * theta.cos() + self.origin_y,
        )
    }
}
