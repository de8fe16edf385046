//! FlexRay record layouts

blf_records! {
    /// FlexRay data frame, legacy layout (type 29)
    FlexRayData {
        channel: u16,
        mux: u8,
        len: u8,
        message_id: u16,
        crc: u16,
        dir: u8,
        reserved_flex_ray_data1: u8,
        reserved_flex_ray_data2: u16,
        data_bytes: [u8; 12],
    }

    /// FlexRay sync frame, legacy layout (type 30)
    FlexRaySync {
        channel: u16,
        mux: u8,
        len: u8,
        message_id: u16,
        crc: u16,
        dir: u8,
        reserved_flex_ray_sync1: u8,
        reserved_flex_ray_sync2: u16,
        data_bytes: [u8; 11],
        cycle: u8,
    }

    /// Start of cycle, V6 layout (type 40)
    FlexRayV6StartCycleEvent {
        channel: u16,
        dir: u8,
        low_time: u8,
        fpga_tick: u32,
        fpga_tick_overflow: u32,
        client_index: u32,
        cluster_time: u32,
        data_bytes: [u8; 2],
        reserved_flex_ray_v6_start_cycle_event: u16,
    }

    /// Frame, V6 layout (type 41)
    FlexRayV6Message {
        channel: u16,
        dir: u8,
        low_time: u8,
        fpga_tick: u32,
        fpga_tick_overflow: u32,
        client_index: u32,
        cluster_time: u32,
        frame_id: u16,
        header_crc: u16,
        frame_state: u16,
        length: u8,
        cycle: u8,
        header_bit_mask: u8,
        reserved_flex_ray_v6_message1: u8,
        reserved_flex_ray_v6_message2: u16,
        data_bytes: [u8; 64],
    }

    /// Controller status (type 45)
    FlexRayStatusEvent {
        channel: u16,
        version: u16,
        status_type: u16,
        info_mask1: u16,
        info_mask2: u16,
        info_mask3: u16,
        reserved_flex_ray_status_event: [u16; 18],
    }

    /// Communication controller error (type 47)
    FlexRayVFrError {
        channel: u16,
        version: u16,
        channel_mask: u16,
        cycle: u8,
        reserved_flex_ray_v_fr_error1: u8,
        client_index: u32,
        cluster_no: u32,
        tag: u32,
        data: [u32; 4],
        reserved_flex_ray_v_fr_error2: u32,
    }

    /// Communication controller status (type 48)
    FlexRayVFrStatus {
        channel: u16,
        version: u16,
        channel_mask: u16,
        cycle: u8,
        reserved_flex_ray_v_fr_status1: u8,
        client_index: u32,
        cluster_no: u32,
        wus: u32,
        cc_sync_state: u32,
        tag: u32,
        data: [u32; 2],
        reserved_flex_ray_v_fr_status2: [u16; 18],
    }

    /// Start of cycle (type 49)
    FlexRayVFrStartCycle {
        channel: u16,
        version: u16,
        channel_mask: u16,
        dir: u8,
        cycle: u8,
        client_index: u32,
        cluster_no: u32,
        nm_size: u16,
        data_bytes: [u8; 12],
        reserved_flex_ray_v_fr_start_cycle1: u16,
        tag: u32,
        data: [u32; 5],
        reserved_flex_ray_v_fr_start_cycle2: u64,
    }

    /// Received frame, fixed 254-byte payload (type 50)
    FlexRayVFrReceiveMsg {
        channel: u16,
        version: u16,
        channel_mask: u16,
        dir: u16,
        client_index: u32,
        cluster_no: u32,
        frame_id: u16,
        header_crc1: u16,
        header_crc2: u16,
        byte_count: u16,
        data_count: u16,
        cycle: u8,
        reserved_flex_ray_v_fr_receive_msg1: u8,
        tag: u32,
        data: u32,
        frame_flags: u32,
        app_parameter: u32,
        data_bytes: [u8; 254],
        reserved_flex_ray_v_fr_receive_msg2: u16,
        reserved_flex_ray_v_fr_receive_msg3: u32,
    }

    /// Received frame with variable payload (type 66)
    FlexRayVFrReceiveMsgEx {
        channel: u16,
        version: u16,
        channel_mask: u16,
        dir: u16,
        client_index: u32,
        cluster_no: u32,
        frame_id: u16,
        header_crc1: u16,
        header_crc2: u16,
        byte_count: u16,
        data_count: len(u16 => data_bytes),
        cycle: u16,
        tag: u32,
        data: u32,
        frame_flags: u32,
        app_parameter: u32,
        frame_crc: u32,
        frame_length_ns: u32,
        frame_id1: u16,
        pdu_offset: u16,
        blf_log_mask: u16,
        reserved_flex_ray_v_fr_receive_msg_ex1: [u16; 13],
        reserved_flex_ray_v_fr_receive_msg_ex2: [u32; 6],
        data_bytes: bytes(data_count),
    }
}
