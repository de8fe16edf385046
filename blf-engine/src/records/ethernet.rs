//! Ethernet and WLAN record layouts

blf_records! {
    /// Ethernet frame, original layout (type 71)
    EthernetFrame {
        source_address: [u8; 6],
        channel: u16,
        destination_address: [u8; 6],
        dir: u16,
        ether_type: u16,
        tpid: u16,
        tci: u16,
        pay_load_length: len(u16 => pay_load),
        reserved_ethernet_frame: u64,
        pay_load: bytes(pay_load_length),
    }

    /// WLAN frame (type 93)
    WlanFrame {
        channel: u16,
        flags: u16,
        dir: u8,
        radio_channel: u8,
        signal_strength: i16,
        signal_quality: u16,
        frame_length: len(u16 => frame_data),
        reserved_wlan_frame: u32,
        frame_data: bytes(frame_length),
    }

    /// WLAN statistics (type 94)
    WlanStatistic {
        channel: u16,
        flags: u16,
        rx_packet_count: u32,
        rx_byte_count: u32,
        tx_packet_count: u32,
        tx_byte_count: u32,
        collision_count: u32,
        error_count: u32,
        reserved_wlan_statistic: u32,
    }

    /// Received erroneous frame (type 102)
    EthernetRxError {
        struct_length: u16,
        channel: u16,
        dir: u16,
        hardware_channel: u16,
        fcs: u32,
        frame_data_length: len(u16 => frame_data),
        reserved_ethernet_rx_error: u16,
        error: u32,
        frame_data: bytes(frame_data_length),
    }

    /// Link status (type 103)
    EthernetStatus {
        channel: u16,
        flags: u16,
        link_status: u8,
        ethernet_phy: u8,
        duplex: u8,
        mdi: u8,
        connector: u8,
        clock_mode: u8,
        pairs: u8,
        hardware_channel: u8,
        bitrate: u32,
    }

    /// Controller statistics (type 114)
    EthernetStatistic {
        channel: u16,
        reserved_ethernet_statistic1: u16,
        reserved_ethernet_statistic2: u32,
        rcv_ok_hw: u64,
        xmit_ok_hw: u64,
        rcv_error_hw: u64,
        xmit_error_hw: u64,
        rcv_bytes_hw: u64,
        xmit_bytes_hw: u64,
        rcv_no_buffer_hw: u64,
        sqi: i16,
        hardware_channel: u16,
        reserved_ethernet_statistic3: u32,
    }

    /// Ethernet frame, extended layout (type 120)
    EthernetFrameEx {
        struct_length: u16,
        flags: u16,
        channel: u16,
        hardware_channel: u16,
        frame_duration: u64,
        frame_checksum: u32,
        dir: u16,
        frame_length: len(u16 => frame_data),
        frame_handle: u32,
        reserved_ethernet_frame_ex: u32,
        frame_data: bytes(frame_length),
    }

    /// Forwarded Ethernet frame (type 121)
    EthernetFrameForwarded {
        struct_length: u16,
        flags: u16,
        channel: u16,
        hardware_channel: u16,
        frame_duration: u64,
        frame_checksum: u32,
        dir: u16,
        frame_length: len(u16 => frame_data),
        frame_handle: u32,
        reserved_ethernet_frame_forwarded: u32,
        frame_data: bytes(frame_length),
    }

    /// Erroneous frame, extended layout (type 122)
    EthernetErrorEx {
        struct_length: u16,
        flags: u16,
        channel: u16,
        hardware_channel: u16,
        frame_duration: u64,
        error_code: u32,
        dir: u16,
        frame_length: len(u16 => frame_data),
        frame_checksum: u32,
        reserved_ethernet_error_ex: u32,
        frame_data: bytes(frame_length),
    }

    /// Forwarded erroneous frame (type 123)
    EthernetErrorForwarded {
        struct_length: u16,
        flags: u16,
        channel: u16,
        hardware_channel: u16,
        frame_duration: u64,
        error_code: u32,
        dir: u16,
        frame_length: len(u16 => frame_data),
        frame_checksum: u32,
        reserved_ethernet_error_forwarded: u32,
        frame_data: bytes(frame_length),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::wire::{ByteReader, RecordBody};
    use crate::types::BlfError;

    #[test]
    fn test_frame_length_matches_payload() {
        let frame = EthernetFrameEx {
            channel: 1,
            frame_data: (0..=255u8).collect(),
            ..Default::default()
        };
        let mut body = Vec::new();
        frame.encode_body(&mut body).unwrap();
        assert_eq!(body.len(), frame.body_size());
        // frame_length follows dir at byte 22
        assert_eq!(u16::from_le_bytes([body[22], body[23]]), 256);

        let mut reader = ByteReader::new(&body, 120);
        let decoded = EthernetFrameEx::decode_body(frame.header, &mut reader).unwrap();
        assert_eq!(decoded.frame_data.len(), 256);
        assert_eq!(decoded, frame);
    }

    #[test]
    fn test_oversized_payload_is_rejected() {
        let frame = EthernetFrame {
            pay_load: vec![0; u16::MAX as usize + 1],
            ..Default::default()
        };
        let mut body = Vec::new();
        assert!(matches!(
            frame.encode_body(&mut body),
            Err(BlfError::RecordTooLarge(_))
        ));
    }
}
