//! USB HID device for the CT1 on ATmega32U4.
//!
//! Two HID interfaces on the built-in USB controller, driven through direct
//! register access via avr-device:
//! - interface 0: boot keyboard, 8-byte reports on EP1 IN
//! - interface 1: consumer control, report ID 2 with one 16-bit usage on EP2 IN
//!
//! Report submission never waits for the endpoint. If the FIFO is not free
//! the report is refused with [`NotReady`] and the scanner moves on.

use avr_device::atmega32u4::Peripherals;
use ct1_keyboard::{ConsumerUsage, HidTransport, KeyboardReport, NotReady};

// USB endpoint configuration
const EP0_SIZE: u8 = 64; // Control endpoint size
const KEYBOARD_EP: u8 = 1;
const CONSUMER_EP: u8 = 2;
const EP_SIZE: u8 = 8; // Interrupt IN endpoint size

const KEYBOARD_INTERFACE: u8 = 0;
const CONSUMER_INTERFACE: u8 = 1;

const CONSUMER_REPORT_ID: u8 = 2;

/// HID report descriptor for a standard boot keyboard.
static KEYBOARD_REPORT_DESCRIPTOR: [u8; 64] = [
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    // Modifier keys (8 bits)
    0x05, 0x07, //   Usage Page (Key Codes)
    0x19, 0xE0, //   Usage Minimum (224) - LCtrl
    0x29, 0xE7, //   Usage Maximum (231) - RGui
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    // Reserved byte
    0x95, 0x01, //   Report Count (1)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x01, //   Input (Constant)
    // LEDs (5 bits)
    0x95, 0x05, //   Report Count (5)
    0x75, 0x01, //   Report Size (1)
    0x05, 0x08, //   Usage Page (LEDs)
    0x19, 0x01, //   Usage Minimum (1)
    0x29, 0x05, //   Usage Maximum (5)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    // LED padding (3 bits)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x03, //   Report Size (3)
    0x91, 0x01, //   Output (Constant)
    // Keycodes (6 bytes)
    0x95, 0x06, //   Report Count (6)
    0x75, 0x08, //   Report Size (8)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, // Logical Maximum (255)
    0x05, 0x07, //   Usage Page (Key Codes)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0xFF, //   Usage Maximum (255)
    0x81, 0x00, //   Input (Data, Array)
    0xC0, // End Collection
];

/// HID report descriptor for consumer control (one usage per report).
static CONSUMER_REPORT_DESCRIPTOR: [u8; 25] = [
    0x05, 0x0C, // Usage Page (Consumer)
    0x09, 0x01, // Usage (Consumer Control)
    0xA1, 0x01, // Collection (Application)
    0x85, CONSUMER_REPORT_ID, //   Report ID (2)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x03, // Logical Maximum (1023)
    0x19, 0x00, //   Usage Minimum (0)
    0x2A, 0xFF, 0x03, // Usage Maximum (1023)
    0x75, 0x10, //   Report Size (16)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x00, //   Input (Data, Array)
    0xC0, // End Collection
];

static DEVICE_DESCRIPTOR: [u8; 18] = [
    18,   // bLength
    1,    // bDescriptorType (Device)
    0x00, 0x02, // bcdUSB (2.0)
    0,    // bDeviceClass (defined at interface level)
    0,    // bDeviceSubClass
    0,    // bDeviceProtocol
    EP0_SIZE, // bMaxPacketSize0
    0xC0, 0x16, // idVendor (0x16C0)
    0x7E, 0x04, // idProduct (0x047E)
    0x02, 0x00, // bcdDevice (2.0)
    1,    // iManufacturer
    2,    // iProduct
    0,    // iSerialNumber
    1,    // bNumConfigurations
];

static CONFIG_DESCRIPTOR: [u8; 59] = [
    // Configuration descriptor
    9,    // bLength
    2,    // bDescriptorType (Configuration)
    59, 0, // wTotalLength
    2,    // bNumInterfaces
    1,    // bConfigurationValue
    0,    // iConfiguration
    0x80, // bmAttributes (bus powered)
    50,   // bMaxPower (100mA)
    // Interface 0: boot keyboard
    9,    // bLength
    4,    // bDescriptorType (Interface)
    KEYBOARD_INTERFACE, // bInterfaceNumber
    0,    // bAlternateSetting
    1,    // bNumEndpoints
    3,    // bInterfaceClass (HID)
    1,    // bInterfaceSubClass (Boot)
    1,    // bInterfaceProtocol (Keyboard)
    0,    // iInterface
    // HID descriptor
    9,    // bLength
    0x21, // bDescriptorType (HID)
    0x11, 0x01, // bcdHID (1.11)
    0,    // bCountryCode
    1,    // bNumDescriptors
    0x22, // bDescriptorType (Report)
    KEYBOARD_REPORT_DESCRIPTOR.len() as u8, 0, // wDescriptorLength
    // Endpoint descriptor (EP1 IN, interrupt)
    7,    // bLength
    5,    // bDescriptorType (Endpoint)
    0x80 | KEYBOARD_EP, // bEndpointAddress
    0x03, // bmAttributes (Interrupt)
    EP_SIZE, 0, // wMaxPacketSize
    10,   // bInterval (10ms polling)
    // Interface 1: consumer control
    9,    // bLength
    4,    // bDescriptorType (Interface)
    CONSUMER_INTERFACE, // bInterfaceNumber
    0,    // bAlternateSetting
    1,    // bNumEndpoints
    3,    // bInterfaceClass (HID)
    0,    // bInterfaceSubClass (None)
    0,    // bInterfaceProtocol (None)
    0,    // iInterface
    // HID descriptor
    9,    // bLength
    0x21, // bDescriptorType (HID)
    0x11, 0x01, // bcdHID (1.11)
    0,    // bCountryCode
    1,    // bNumDescriptors
    0x22, // bDescriptorType (Report)
    CONSUMER_REPORT_DESCRIPTOR.len() as u8, 0, // wDescriptorLength
    // Endpoint descriptor (EP2 IN, interrupt)
    7,    // bLength
    5,    // bDescriptorType (Endpoint)
    0x80 | CONSUMER_EP, // bEndpointAddress
    0x03, // bmAttributes (Interrupt)
    EP_SIZE, 0, // wMaxPacketSize
    10,   // bInterval (10ms polling)
];

/// String descriptor 0 (language ID)
static STRING_DESC_0: [u8; 4] = [4, 3, 0x09, 0x04]; // English (US)

/// String descriptor 1 (manufacturer): "MagicTINTIN"
static STRING_DESC_1: [u8; 24] = [
    24, 3, // bLength, bDescriptorType
    b'M', 0, b'a', 0, b'g', 0, b'i', 0, b'c', 0, b'T', 0, b'I', 0, b'N', 0,
    b'T', 0, b'I', 0, b'N', 0,
];

/// String descriptor 2 (product): "ChrisT1 Clavier"
static STRING_DESC_2: [u8; 32] = [
    32, 3, // bLength, bDescriptorType
    b'C', 0, b'h', 0, b'r', 0, b'i', 0, b's', 0, b'T', 0, b'1', 0, b' ', 0,
    b'C', 0, b'l', 0, b'a', 0, b'v', 0, b'i', 0, b'e', 0, b'r', 0,
];

/// USB device state.
pub struct UsbHid<'a> {
    dp: &'a Peripherals,
    configured: bool,
}

impl<'a> UsbHid<'a> {
    pub fn new(dp: &'a Peripherals) -> Self {
        Self {
            dp,
            configured: false,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Initialize the ATmega32U4 USB controller.
    pub fn init(&mut self) {
        let dp = self.dp;
        let usb = &dp.USB_DEVICE;

        // Enable USB pad regulator
        usb.uhwcon.write(|w| w.uvrege().set_bit());

        // Enable USB controller and VBUS pad
        usb.usbcon.write(|w| w.usbe().set_bit().otgpade().set_bit());

        // Configure PLL for 16MHz crystal -> 96MHz PLL -> 48MHz USB clock
        dp.PLL.pllcsr.write(|w| w.pindiv().set_bit().plle().set_bit());

        // Wait for PLL lock
        while dp.PLL.pllcsr.read().plock().bit_is_clear() {}

        // Enable USB clock
        usb.usbcon.modify(|_, w| w.frzclk().clear_bit());

        // Attach to bus (clear DETACH)
        usb.udcon.modify(|_, w| w.detach().clear_bit());

        // Enable End-Of-Reset interrupt
        usb.udien.write(|w| w.eorste().set_bit());

        self.configured = false;
    }

    /// Poll for USB events and handle them. Call this from the main loop.
    pub fn poll(&mut self) {
        let dp = self.dp;
        let usb = &dp.USB_DEVICE;

        // End of reset
        if usb.udint.read().eorsti().bit_is_set() {
            usb.udint.modify(|_, w| w.eorsti().clear_bit());
            self.configure_ep0();
            self.configured = false;
        }

        // Check for SETUP packet on EP0
        self.select_endpoint(0);
        if usb.ueintx.read().rxstpi().bit_is_set() {
            self.handle_setup();
        }
    }

    /// Claim the FIFO of an IN endpoint, or report that it is still busy.
    fn claim_in_endpoint(&self, ep: u8) -> Result<(), NotReady> {
        if !self.configured {
            return Err(NotReady);
        }
        self.select_endpoint(ep);
        // RWAL set means the bank can take data
        if self.dp.USB_DEVICE.ueintx.read().rwal().bit_is_clear() {
            return Err(NotReady);
        }
        Ok(())
    }

    fn write_bytes(&self, bytes: &[u8]) {
        let usb = &self.dp.USB_DEVICE;
        for &byte in bytes {
            usb.uedatx.write(|w| w.bits(byte));
        }
        // Clear FIFOCON and TXINI to send
        usb.ueintx
            .modify(|_, w| w.fifocon().clear_bit().txini().clear_bit());
    }

    fn configure_ep0(&self) {
        let usb = &self.dp.USB_DEVICE;

        self.select_endpoint(0);
        // Enable EP0 as control endpoint, 64 bytes
        usb.ueconx.write(|w| w.epen().set_bit());
        usb.uecfg0x.write(|w| w.eptype().bits(0b00));
        usb.uecfg1x.write(|w| w.epsize().bits(0b011).alloc().set_bit());
    }

    /// Interrupt IN endpoint, 8 bytes, single bank.
    fn configure_interrupt_in(&self, ep: u8) {
        let usb = &self.dp.USB_DEVICE;

        self.select_endpoint(ep);
        usb.ueconx.write(|w| w.epen().set_bit());
        usb.uecfg0x
            .write(|w| w.eptype().bits(0b11).epdir().set_bit());
        usb.uecfg1x.write(|w| w.epsize().bits(0b000).alloc().set_bit());
    }

    fn select_endpoint(&self, ep: u8) {
        self.dp.USB_DEVICE.uenum.write(|w| w.bits(ep & 0x07));
    }

    fn handle_setup(&mut self) {
        let dp = self.dp;
        let usb = &dp.USB_DEVICE;

        // Read 8-byte SETUP packet
        let bm_request_type = usb.uedatx.read().bits();
        let b_request = usb.uedatx.read().bits();
        let w_value_l = usb.uedatx.read().bits();
        let w_value_h = usb.uedatx.read().bits();
        let w_index_l = usb.uedatx.read().bits();
        let _w_index_h = usb.uedatx.read().bits();
        let w_length_l = usb.uedatx.read().bits();
        let w_length_h = usb.uedatx.read().bits();

        // Acknowledge SETUP
        usb.ueintx.modify(|_, w| w.rxstpi().clear_bit());

        let w_length = (w_length_h as u16) << 8 | w_length_l as u16;

        match (bm_request_type, b_request) {
            // GET_DESCRIPTOR
            (0x80, 0x06) => match (w_value_h, w_value_l) {
                (1, _) => self.send_descriptor(&DEVICE_DESCRIPTOR, w_length),
                (2, _) => self.send_descriptor(&CONFIG_DESCRIPTOR, w_length),
                (3, 0) => self.send_descriptor(&STRING_DESC_0, w_length),
                (3, 1) => self.send_descriptor(&STRING_DESC_1, w_length),
                (3, 2) => self.send_descriptor(&STRING_DESC_2, w_length),
                _ => self.stall(),
            },

            // SET_ADDRESS
            (0x00, 0x05) => {
                // Send ZLP first, then set address
                usb.ueintx.modify(|_, w| w.txini().clear_bit());
                while usb.ueintx.read().txini().bit_is_clear() {}
                usb.udaddr
                    .write(|w| w.uadd().bits(w_value_l & 0x7F).adden().set_bit());
            }

            // SET_CONFIGURATION
            (0x00, 0x09) => {
                // Send ZLP
                usb.ueintx.modify(|_, w| w.txini().clear_bit());
                self.configure_interrupt_in(KEYBOARD_EP);
                self.configure_interrupt_in(CONSUMER_EP);
                self.configured = true;
            }

            // GET_CONFIGURATION
            (0x80, 0x08) => {
                while usb.ueintx.read().txini().bit_is_clear() {}
                usb.uedatx.write(|w| w.bits(u8::from(self.configured)));
                usb.ueintx.modify(|_, w| w.txini().clear_bit());
            }

            // HID GET_DESCRIPTOR (interface-level), wIndex picks the interface
            (0x81, 0x06) => match (w_value_h, w_index_l) {
                (0x22, KEYBOARD_INTERFACE) => {
                    self.send_descriptor(&KEYBOARD_REPORT_DESCRIPTOR, w_length)
                }
                (0x22, CONSUMER_INTERFACE) => {
                    self.send_descriptor(&CONSUMER_REPORT_DESCRIPTOR, w_length)
                }
                _ => self.stall(),
            },

            // HID SET_IDLE, HID SET_PROTOCOL
            (0x21, 0x0A) | (0x21, 0x0B) => {
                // Send ZLP
                usb.ueintx.modify(|_, w| w.txini().clear_bit());
            }

            _ => self.stall(),
        }
    }

    fn send_descriptor(&self, desc: &[u8], max_length: u16) {
        let usb = &self.dp.USB_DEVICE;
        let len = core::cmp::min(desc.len(), max_length as usize);
        let mut sent = 0;

        while sent < len {
            while usb.ueintx.read().txini().bit_is_clear() {}

            let chunk_end = core::cmp::min(sent + EP0_SIZE as usize, len);
            for &byte in &desc[sent..chunk_end] {
                usb.uedatx.write(|w| w.bits(byte));
            }

            usb.ueintx.modify(|_, w| w.txini().clear_bit());
            sent = chunk_end;
        }

        // Wait for status stage (host sends ZLP)
        while usb.ueintx.read().rxouti().bit_is_clear() {}
        usb.ueintx.modify(|_, w| w.rxouti().clear_bit());
    }

    fn stall(&self) {
        self.dp
            .USB_DEVICE
            .ueconx
            .modify(|_, w| w.stallrq().set_bit());
    }
}

impl HidTransport for UsbHid<'_> {
    fn submit_keyboard(&mut self, report: &KeyboardReport) -> Result<(), NotReady> {
        self.claim_in_endpoint(KEYBOARD_EP)?;
        self.write_bytes(&report.to_bytes());
        Ok(())
    }

    fn submit_consumer(&mut self, usage: Option<ConsumerUsage>) -> Result<(), NotReady> {
        self.claim_in_endpoint(CONSUMER_EP)?;
        let [lo, hi] = usage.map_or([0, 0], ConsumerUsage::to_le_bytes);
        self.write_bytes(&[CONSUMER_REPORT_ID, lo, hi]);
        Ok(())
    }
}
