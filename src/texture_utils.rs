pub fn align(value: usize, increment: usize) -> usize {
    if increment <= 1 {
        value
    } else {
        let tmp = value % increment;
        if tmp > 0 {
            value + (increment - tmp)
        } else {
            value
        }
    }
}

// Some tools can only load power-of-two textures, so sprites can be stretched to fit.
pub fn power_of_two_dimensions(width: u32, height: u32) -> (u32, u32) {
    (width.next_power_of_two(), height.next_power_of_two())
}
