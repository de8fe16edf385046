//! CAN and CAN FD record layouts

blf_struct! {
    /// Bit timing of one CAN FD controller phase pair
    CanBitTimings {
        arbitration_bitrate: u32,
        arbitration_tseg1: u16,
        arbitration_tseg2: u16,
        arbitration_sjw: u16,
        arbitration_sample_mode: u16,
        data_bitrate: u32,
        data_tseg1: u16,
        data_tseg2: u16,
        data_sjw: u16,
        data_sample_mode: u16,
        flags: u32,
    }
}

blf_records! {
    /// Classic CAN frame (type 1)
    CanMessage {
        channel: u16,
        /// Direction (bit 0) and RTR (bit 7)
        flags: u8,
        dlc: u8,
        id: u32,
        data: [u8; 8],
    }

    /// CAN error frame (type 2)
    CanErrorFrame {
        channel: u16,
        length: u16,
        reserved_can_error_frame: u32,
    }

    /// CAN overload frame (type 3)
    CanOverloadFrame {
        channel: u16,
        reserved_can_overload_frame1: u16,
        reserved_can_overload_frame2: u32,
    }

    /// Driver statistics for one channel (type 4)
    CanDriverStatistic {
        channel: u16,
        /// Bus load in 1/100 percent
        bus_load: u16,
        standard_data_frames: u32,
        extended_data_frames: u32,
        standard_remote_frames: u32,
        extended_remote_frames: u32,
        error_frames: u32,
        overload_frames: u32,
        reserved_can_driver_statistic: u32,
    }

    /// Controller error counters (type 31)
    CanDriverError {
        channel: u16,
        tx_errors: u8,
        rx_errors: u8,
        error_code: u32,
    }

    /// Hardware synchronisation pulse (type 44)
    CanDriverHwSync {
        channel: u16,
        flags: u8,
        reserved_can_driver_hw_sync1: u8,
        reserved_can_driver_hw_sync2: u32,
    }

    /// Extended CAN error frame (type 73)
    CanErrorFrameExt {
        channel: u16,
        length: u16,
        flags: u32,
        ecc: u8,
        position: u8,
        dlc: u8,
        reserved_can_error_frame_ext1: u8,
        frame_length_in_ns: u32,
        id: u32,
        flags_ext: u16,
        reserved_can_error_frame_ext2: u16,
        data: [u8; 8],
    }

    /// Extended controller error (type 74)
    CanDriverErrorExt {
        channel: u16,
        tx_errors: u8,
        rx_errors: u8,
        error_code: u32,
        flags: u32,
        state: u8,
        reserved_can_driver_error_ext1: u8,
        reserved_can_driver_error_ext2: u16,
        reserved_can_driver_error_ext3: [u32; 4],
    }

    /// CAN frame with variable data length (type 86)
    CanMessage2 {
        channel: u16,
        flags: u8,
        dlc: u8,
        id: u32,
        data: rest,
        frame_length: u32,
        bit_count: u8,
        reserved_can_message1: u8,
        reserved_can_message2: u16,
    }

    /// CAN FD frame, fixed 64-byte data area (type 100)
    CanFdMessage {
        channel: u16,
        flags: u8,
        dlc: u8,
        id: u32,
        frame_length: u32,
        arb_bit_count: u8,
        can_fd_flags: u8,
        valid_data_bytes: u8,
        reserved_can_fd_message1: u8,
        reserved_can_fd_message2: u32,
        data: [u8; 64],
        reserved_can_fd_message3: u32,
    }

    /// CAN FD frame with per-frame bit timing (type 101)
    CanFdMessage64 {
        channel: u8,
        dlc: u8,
        valid_data_bytes: len(u8 => data),
        tx_count: u8,
        id: u32,
        frame_length: u32,
        flags: u32,
        btr_cfg_arb: u32,
        btr_cfg_data: u32,
        time_offset_brs_ns: u32,
        time_offset_crc_del_ns: u32,
        bit_count: u16,
        dir: u8,
        ext_data_offset: u8,
        crc: u32,
        data: bytes(valid_data_bytes),
    }

    /// CAN FD error frame (type 104)
    CanFdErrorFrame64 {
        channel: u8,
        dlc: u8,
        valid_data_bytes: len(u8 => data),
        ecc: u8,
        flags: u16,
        error_code_ext: u16,
        ext_flags: u16,
        ext_data_offset: u8,
        reserved1: u8,
        id: u32,
        frame_length: u32,
        btr_cfg_arb: u32,
        btr_cfg_data: u32,
        time_offset_brs_ns: u32,
        time_offset_crc_del_ns: u32,
        crc: u32,
        error_position: u16,
        reserved2: u16,
        data: bytes(valid_data_bytes),
    }

    /// Controller configuration change (type 129)
    CanSettingChanged {
        channel: u16,
        changed_type: u8,
        reserved1: u8,
        bit_timings: CanBitTimings,
    }
}
