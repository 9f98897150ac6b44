//! PDF permissions according to ISO 32000-1 Table 22

/// Permission flags for encrypted PDFs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    bits: u32,
}

impl Permissions {
    /// All operations prohibited.
    ///
    /// Bits 1-2 must be 0, bits 7-8 are reserved (1) and bits 13-32 must be 1.
    pub fn new() -> Self {
        Self { bits: 0xFFFFF0C0 }
    }

    /// Policy applied to every generated document: printing (including
    /// high-quality printing) is allowed, everything else is denied.
    pub fn print_only() -> Self {
        let mut perm = Self::new();
        perm.set_print(true).set_print_high_quality(true);
        perm
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Value of the `/P` entry, the bits read as a signed 32-bit integer.
    pub fn p_value(&self) -> i32 {
        self.bits as i32
    }

    pub fn from_bits(bits: u32) -> Self {
        Self { bits }
    }

    fn set_bit(&mut self, bit: u32, allow: bool) -> &mut Self {
        if allow {
            self.bits |= 1 << (bit - 1);
        } else {
            self.bits &= !(1 << (bit - 1));
        }
        self
    }

    fn bit(&self, bit: u32) -> bool {
        self.bits & (1 << (bit - 1)) != 0
    }

    /// Bit 3
    pub fn set_print(&mut self, allow: bool) -> &mut Self {
        self.set_bit(3, allow)
    }

    pub fn can_print(&self) -> bool {
        self.bit(3)
    }

    /// Bit 4
    pub fn can_modify_contents(&self) -> bool {
        self.bit(4)
    }

    /// Bit 5
    pub fn can_copy(&self) -> bool {
        self.bit(5)
    }

    /// Bit 6
    pub fn can_modify_annotations(&self) -> bool {
        self.bit(6)
    }

    /// Bit 9
    pub fn can_fill_forms(&self) -> bool {
        self.bit(9)
    }

    /// Bit 10
    pub fn can_extract_for_accessibility(&self) -> bool {
        self.bit(10)
    }

    /// Bit 11
    pub fn can_assemble(&self) -> bool {
        self.bit(11)
    }

    /// Bit 12
    pub fn set_print_high_quality(&mut self, allow: bool) -> &mut Self {
        self.set_bit(12, allow)
    }

    pub fn can_print_high_quality(&self) -> bool {
        self.bit(12)
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::new()
    }
}
