//! Name-derived colors shared by the chart, the table and the country chips.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn rgba(self, alpha: f32) -> String {
        format!("rgba({}, {}, {}, {alpha})", self.r, self.g, self.b)
    }

    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

pub fn string_to_rgb(name: &str) -> Rgb {
    let hash = name.encode_utf16().fold(0i32, |hash, unit| {
        i32::from(unit).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
    });
    let [_, r, g, b] = hash.to_be_bytes();
    Rgb { r, g, b }
}

pub fn string_to_hex(name: &str) -> String {
    string_to_rgb(name).hex()
}
