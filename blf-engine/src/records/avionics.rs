//! AFDX and ARINC 429 record layouts

blf_struct! {
    /// Link state of one AFDX line
    AfdxLineStatus {
        flags: u16,
        link_status: u8,
        ethernet_phy: u8,
        duplex: u8,
        mdi: u8,
        connector: u8,
        clock_mode: u8,
        pairs: u8,
        reserved: u8,
        bitrate: u32,
    }
}

blf_records! {
    /// AFDX frame (type 97)
    AfdxFrame {
        source_address: [u8; 6],
        channel: u16,
        destination_address: [u8; 6],
        dir: u16,
        ether_type: u16,
        tpid: u16,
        tci: u16,
        eth_channel: u8,
        reserved_afdx_frame1: u8,
        afdx_flags: u16,
        reserved_afdx_frame2: u16,
        bag_usec: u32,
        pay_load_length: len(u16 => pay_load),
        reserved_afdx_frame3: u16,
        reserved_afdx_frame4: u32,
        pay_load: bytes(pay_load_length),
    }

    /// AFDX virtual link statistics (type 98)
    AfdxStatistic {
        channel: u16,
        flags: u16,
        rx_packet_count: u32,
        rx_byte_count: u32,
        tx_packet_count: u32,
        tx_byte_count: u32,
        collision_count: u32,
        error_count: u32,
        stat_dropped_redundant_packet_count: u32,
        stat_redundant_error_packet_count: u32,
        stat_integrity_error_packet_count: u32,
        stat_avrg_period_msec: u32,
        stat_avrg_jitter_mysec: u32,
        vlid: u32,
        stat_duration: u32,
    }

    /// AFDX line status (type 106)
    AfdxStatus {
        channel: u16,
        reserved_afdx_status1: u16,
        status_a: AfdxLineStatus,
        status_b: AfdxLineStatus,
        reserved_afdx_status2: u32,
    }

    /// AFDX bus statistics (type 107)
    AfdxBusStatistic {
        channel: u16,
        flags: u16,
        stat_duration: u32,
        stat_rx_packet_count_hw: u32,
        stat_tx_packet_count_hw: u32,
        stat_rx_error_count_hw: u32,
        stat_tx_error_count_hw: u32,
        stat_rx_bytes_hw: u32,
        stat_tx_bytes_hw: u32,
        stat_rx_packet_count: u32,
        stat_tx_packet_count: u32,
        stat_dropped_packet_count: u32,
        stat_invalid_packet_count: u32,
        stat_lost_packet_count: u32,
        line: u8,
        link_status: u8,
        link_speed: u16,
        link_lost: u16,
        reserved_afdx_bus_statistic1: u16,
        reserved_afdx_bus_statistic2: u32,
    }

    /// AFDX error event (type 109)
    AfdxErrorEvent {
        channel: u16,
        error_level: u16,
        source_identifier: u32,
        error_text: [u8; 512],
        error_attributes: [u8; 512],
    }

    /// ARINC 429 error (type 110)
    A429Error {
        channel: u16,
        error_type: u16,
        source_identifier: u32,
        err_reason: u32,
        error_text: [u8; 512],
        error_attributes: [u8; 512],
        reserved_a429_error: u32,
    }

    /// ARINC 429 channel status (type 111)
    A429Status {
        channel: u16,
        dir: u8,
        reserved_a429_status1: u8,
        parity: u16,
        reserved_a429_status2: u16,
        min_gap: u32,
        bitrate: u32,
        min_bitrate: u32,
        max_bitrate: u32,
    }

    /// ARINC 429 bus statistics (type 112)
    A429BusStatistic {
        channel: u16,
        dir: u8,
        reserved_a429_bus_statistic: u8,
        busload: u32,
        data_total: u32,
        error_total: u32,
        bitrate: u32,
        parity_errors: u16,
        bitrate_errors: u16,
        gap_errors: u16,
        line_errors: u16,
        format_errors: u16,
        duty_factor_errors: u16,
        word_len_errors: u16,
        coding_errors: u16,
        idle_errors: u16,
        level_errors: u16,
        label_count: [u16; 256],
    }

    /// ARINC 429 word (type 113)
    A429Message {
        a429_data: [u8; 4],
        channel: u16,
        dir: u8,
        reserved_a429_message1: u8,
        bitrate: u32,
        err_reason: i32,
        err_position: u16,
        reserved_a429_message2: u16,
        reserved_a429_message3: u32,
        frame_gap: u64,
        frame_length: u32,
        msg_ctrl: u16,
        reserved_a429_message4: u16,
        cycle_time: u32,
        error: u32,
        bit_len_of_last_bit: u32,
        reserved_a429_message5: u32,
    }
}
