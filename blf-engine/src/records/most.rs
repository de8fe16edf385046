//! MOST record layouts (MOST25, MOST50, MOST150 and MOST Ethernet)

blf_records! {
    /// Control message seen by the spy (type 22)
    MostSpy {
        channel: u16,
        dir: u8,
        reserved_most_spy1: u8,
        source_adr: u32,
        dest_adr: u32,
        msg: [u8; 17],
        reserved_most_spy2: u8,
        r_typ: u16,
        r_typ_adr: u8,
        state: u8,
        reserved_most_spy3: u8,
        ack_nack: u8,
        crc: u32,
    }

    /// Control message sent or received by the node (type 23)
    MostCtrl {
        channel: u16,
        dir: u8,
        reserved_most_ctrl1: u8,
        source_adr: u32,
        dest_adr: u32,
        msg: [u8; 17],
        reserved_most_ctrl2: u8,
        r_typ: u16,
        r_typ_adr: u8,
        state: u8,
        reserved_most_ctrl3: u8,
        ack_nack: u8,
        reserved_most_ctrl4: u32,
    }

    /// Light and lock state (type 24)
    MostLightLock {
        channel: u16,
        state: i16,
        reserved_most_light_lock: u32,
    }

    /// Bus statistics (type 25)
    MostStatistic {
        channel: u16,
        pkt_cnt: u16,
        frm_cnt: i32,
        light_cnt: i32,
        buffer_level: i32,
    }

    /// Asynchronous packet (type 32)
    MostPkt {
        channel: u16,
        dir: u8,
        reserved_most_pkt1: u8,
        source_adr: u32,
        dest_adr: u32,
        arbitration: u8,
        time_res: u8,
        quads_to_follow: u8,
        reserved_most_pkt2: u8,
        crc: u16,
        priority: u8,
        transfer_type: u8,
        state: u8,
        reserved_most_pkt3: [u8; 3],
        pkt_data_length: len(u32 => pkt_data),
        reserved_most_pkt4: u32,
        pkt_data: bytes(pkt_data_length),
    }

    /// Asynchronous packet, second header layout (type 33)
    MostPkt2 {
        channel: u16,
        dir: u8,
        reserved_most_pkt1: u8,
        source_adr: u32,
        dest_adr: u32,
        arbitration: u8,
        time_res: u8,
        quads_to_follow: u8,
        reserved_most_pkt2: u8,
        crc: u16,
        priority: u8,
        transfer_type: u8,
        state: u8,
        reserved_most_pkt3: [u8; 3],
        pkt_data_length: len(u32 => pkt_data),
        reserved_most_pkt4: u32,
        pkt_data: bytes(pkt_data_length),
    }

    /// Hardware mode (type 34)
    MostHwMode {
        channel: u16,
        reserved_most_hw_mode: u16,
        hw_mode: u16,
        hw_mode_mask: u16,
    }

    /// Register access (type 35)
    MostReg {
        channel: u16,
        sub_type: u8,
        reserved_most_reg: u8,
        handle: u32,
        offset: u32,
        chip: u16,
        reg_data_len: u16,
        reg_data: [u8; 16],
    }

    /// General register access (type 36)
    MostGenReg {
        channel: u16,
        sub_type: u8,
        reserved_most_gen_reg1: u8,
        handle: u32,
        reg_id: u16,
        reserved_most_gen_reg2: u16,
        reserved_most_gen_reg3: u32,
        reg_value: u64,
    }

    /// Network state change (type 37)
    MostNetState {
        channel: u16,
        state_new: u16,
        state_old: u16,
        reserved_most_net_state: u16,
    }

    /// Data loss report (type 38)
    MostDataLost {
        channel: u16,
        reserved_most_data_lost: u16,
        info: u32,
        lost_msgs_ctrl: u32,
        lost_msgs_async: u32,
        last_good_time_stamp_ns: u64,
        next_good_time_stamp_ns: u64,
    }

    /// Trigger line change (type 39)
    MostTrigger {
        channel: u16,
        reserved_most_trigger: u16,
        mode: u16,
        hw: u16,
        previous_trigger_value: u32,
        current_trigger_value: u32,
    }

    /// Extended statistics (type 67)
    MostStatisticEx {
        channel: u16,
        reserved_most_statistic_ex1: u16,
        coding_errors: u32,
        frame_counter: u32,
        reserved_most_statistic_ex2: u32,
    }

    /// Transmit light state (type 68)
    MostTxLight {
        channel: u16,
        state: u16,
        reserved_most_tx_light: u32,
    }

    /// Allocation table (type 69)
    MostAllocTab {
        channel: u16,
        length: len(u16 => table_data),
        reserved_most_alloc_tab: u32,
        table_data: bytes(length),
    }

    /// Stress mode (type 70)
    MostStress {
        channel: u16,
        state: u16,
        mode: u16,
        reserved_most_stress: u16,
    }

    /// MOST150 control message (type 76)
    Most150Message {
        channel: u16,
        dir: u8,
        reserved_most150_message1: u8,
        source_adr: u32,
        dest_adr: u32,
        transfer_type: u8,
        state: u8,
        ack_nack: u8,
        reserved_most150_message2: u8,
        crc: u32,
        p_ack: u8,
        c_ack: u8,
        priority: u8,
        p_index: u8,
        msg_len: len(u32 => msg),
        reserved_most150_message3: u32,
        msg: bytes(msg_len),
    }

    /// MOST150 packet (type 77)
    Most150Pkt {
        channel: u16,
        dir: u8,
        reserved_most150_pkt1: u8,
        source_adr: u32,
        dest_adr: u32,
        transfer_type: u8,
        state: u8,
        ack_nack: u8,
        reserved_most150_pkt2: u8,
        crc: u32,
        p_ack: u8,
        c_ack: u8,
        priority: u8,
        p_index: u8,
        pkt_data_length: len(u32 => pkt_data),
        reserved_most150_pkt3: u32,
        pkt_data: bytes(pkt_data_length),
    }

    /// MOST Ethernet packet (type 78)
    MostEthernetPkt {
        channel: u16,
        dir: u8,
        reserved_most_ethernet_pkt1: u8,
        reserved_most_ethernet_pkt2: u32,
        source_mac_adr: u64,
        dest_mac_adr: u64,
        transfer_type: u8,
        state: u8,
        ack_nack: u8,
        reserved_most_ethernet_pkt3: u8,
        crc: u32,
        p_ack: u8,
        c_ack: u8,
        reserved_most_ethernet_pkt4: u16,
        pkt_data_length: len(u32 => pkt_data),
        reserved_most_ethernet_pkt5: u32,
        pkt_data: bytes(pkt_data_length),
    }

    /// Partially transmitted MOST150 message (type 79)
    Most150MessageFragment {
        channel: u16,
        reserved_most150_message_fragment1: u8,
        ack_nack: u8,
        valid_mask: u32,
        source_adr: u32,
        dest_adr: u32,
        p_ack: u8,
        c_ack: u8,
        priority: u8,
        p_index: u8,
        crc: u32,
        data_len: u32,
        data_len_announced: u32,
        first_data_len: len(u32 => first_data),
        reserved_most150_message_fragment2: u32,
        first_data: bytes(first_data_len),
    }

    /// Partially transmitted MOST150 packet (type 80)
    Most150PktFragment {
        channel: u16,
        reserved_most150_pkt_fragment1: u8,
        ack_nack: u8,
        valid_mask: u32,
        source_adr: u32,
        dest_adr: u32,
        p_ack: u8,
        c_ack: u8,
        priority: u8,
        p_index: u8,
        crc: u32,
        data_len: u32,
        data_len_announced: u32,
        first_data_len: len(u32 => first_data),
        reserved_most150_pkt_fragment2: u32,
        first_data: bytes(first_data_len),
    }

    /// Partially transmitted MOST Ethernet packet (type 81)
    MostEthernetPktFragment {
        channel: u16,
        reserved_most_ethernet_pkt_fragment1: u8,
        ack_nack: u8,
        valid_mask: u32,
        source_mac_adr: u64,
        dest_mac_adr: u64,
        p_ack: u8,
        c_ack: u8,
        reserved_most_ethernet_pkt_fragment2: u16,
        crc: u32,
        data_len: u32,
        data_len_announced: u32,
        first_data_len: len(u32 => first_data),
        reserved_most_ethernet_pkt_fragment3: u32,
        first_data: bytes(first_data_len),
    }

    /// System event (type 82)
    MostSystemEvent {
        channel: u16,
        id: u16,
        value: u32,
        value_old: u32,
        reserved_most_system_event: u32,
    }

    /// MOST150 allocation table (type 83)
    Most150AllocTab {
        channel: u16,
        event_mode_flags: u16,
        free_bytes: u16,
        length: u16,
        reserved_most150_alloc_tab: u32,
        table_data: rest,
    }

    /// MOST50 control message (type 84)
    Most50Message {
        channel: u16,
        dir: u8,
        reserved_most50_message1: u8,
        source_adr: u32,
        dest_adr: u32,
        transfer_type: u8,
        state: u8,
        ack_nack: u8,
        reserved_most50_message2: u8,
        crc: u32,
        reserved_most50_message3: u16,
        priority: u8,
        reserved_most50_message4: u8,
        msg_len: len(u32 => msg),
        reserved_most50_message5: u32,
        msg: bytes(msg_len),
    }

    /// MOST50 packet (type 85)
    Most50Pkt {
        channel: u16,
        dir: u8,
        reserved_most50_pkt1: u8,
        source_adr: u32,
        dest_adr: u32,
        transfer_type: u8,
        state: u8,
        ack_nack: u8,
        reserved_most50_pkt2: u8,
        crc: u32,
        reserved_most50_pkt3: u16,
        priority: u8,
        reserved_most50_pkt4: u8,
        pkt_data_length: len(u32 => pkt_data),
        reserved_most50_pkt5: u32,
        pkt_data: bytes(pkt_data_length),
    }

    /// Electrical control line state (type 95)
    MostEcl {
        channel: u16,
        mode: u16,
        ecl_state: u16,
        reserved_most_ecl: u16,
    }
}
