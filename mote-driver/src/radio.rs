/// Result of handing a frame to the radio.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    /// The frame went out (and was acknowledged if the radio handles ACKs).
    Ok,
    /// The channel was busy or another frame was on air.
    Collision,
    /// The radio waited for an ACK in hardware and none arrived.
    NoAck,
    /// Transient driver error, the frame may be retried.
    Err,
    /// The frame can never be sent as is.
    ErrFatal,
}

/// Generic radio driver interface.
///
/// This is the complete set of operations the radio duty cycling layer needs.
/// Device specific drivers implement it on top of their bus and register
/// access. Transmission is split into two steps so that the duty cycling
/// layer can inspect the radio between loading the frame and putting it on
/// air:
///
/// 1. [`RadioDriver::prepare`] copies the frame into the radio's TX buffer,
/// 2. [`RadioDriver::transmit`] sends the prepared frame.
///
/// [`RadioDriver::send`] does both in one go.
///
/// Interrupt handlers of a driver SHALL only copy received bytes and request
/// a poll of the process that reads them out. All methods of this trait are
/// called from process context.
pub trait RadioDriver {
    /// Initializes the radio. Returns whether the radio is usable.
    fn init(&mut self) -> bool;

    /// Loads the given frame into the radio's TX buffer.
    fn prepare(&mut self, payload: &[u8]) -> TxStatus;

    /// Sends `len` bytes of the previously prepared frame.
    fn transmit(&mut self, len: usize) -> TxStatus;

    /// Prepares and transmits the given frame.
    fn send(&mut self, payload: &[u8]) -> TxStatus;

    /// Reads a received frame into `buf`. Returns the number of bytes read,
    /// zero if no frame was available or it didn't fit.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Performs a clear channel assessment.
    fn channel_clear(&mut self) -> bool;

    /// Whether the radio is currently receiving a frame.
    fn receiving_packet(&mut self) -> bool;

    /// Whether a received frame waits to be read.
    fn pending_packet(&mut self) -> bool;

    /// Switches the receiver on.
    fn on(&mut self) -> bool;

    /// Switches the radio off.
    fn off(&mut self) -> bool;
}
