//! Trait abstraction for the LANC line and shift-capture unit to enable testing

/// Capabilities the receiver needs from the hardware
///
/// On a device these are a handful of register writes. The simulator and the
/// test mocks implement them in software.
pub trait LancLine {
    /// Drive the line low (start bit)
    fn assert_line(&mut self);

    /// Stop driving the line and let the pull-up hold it high
    fn release_line(&mut self);

    /// Configure the shift-capture unit for one 8-bit capture, clear its
    /// completion flag and enable its completion interrupt
    fn arm_sampler(&mut self);

    /// Stop the shift-capture unit so it does not run past one byte
    fn disarm_sampler(&mut self);

    /// Raw contents of the shift-capture buffer
    fn read_sampled_byte(&mut self) -> u8;
}
