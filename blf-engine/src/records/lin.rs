//! LIN record layouts
//!
//! The second-generation LIN records (types 57 onwards) share a chain of
//! nested prefixes: bus event, synch field, message descriptor and databyte
//! timestamps. Those are modelled as nested fixed-width structures.

blf_struct! {
    /// Common prefix of LIN bus events
    LinBusEvent {
        sof: u64,
        event_baudrate: u32,
        channel: u16,
        reserved_lin_bus_event: u16,
    }
}

blf_struct! {
    LinSynchFieldEvent {
        bus_event: LinBusEvent,
        synch_break_length: u64,
        synch_del_length: u64,
    }
}

blf_struct! {
    LinMessageDescriptor {
        synch_field: LinSynchFieldEvent,
        supplier_id: u16,
        message_id: u16,
        nad: u8,
        id: u8,
        dlc: u8,
        checksum_model: u8,
    }
}

blf_struct! {
    LinDatabyteTimestampEvent {
        descriptor: LinMessageDescriptor,
        databyte_timestamps: [u64; 9],
    }
}

blf_records! {
    /// LIN frame (type 11)
    LinMessage {
        channel: u16,
        id: u8,
        dlc: u8,
        data: [u8; 8],
        fsm_id: u8,
        fsm_state: u8,
        header_time: u8,
        full_time: u8,
        crc: u16,
        dir: u8,
        reserved_lin_message1: u8,
        reserved_lin_message2: u32,
    }

    /// LIN checksum error (type 12)
    LinCrcError {
        channel: u16,
        id: u8,
        dlc: u8,
        data: [u8; 8],
        fsm_id: u8,
        fsm_state: u8,
        header_time: u8,
        full_time: u8,
        crc: u16,
        dir: u8,
        reserved_lin_crc_error1: u8,
        reserved_lin_crc_error2: u32,
    }

    /// LIN DLC detection info (type 13)
    LinDlcInfo {
        channel: u16,
        id: u8,
        dlc: u8,
        reserved_lin_dlc_info: u32,
    }

    /// LIN receive error (type 14)
    LinReceiveError {
        channel: u16,
        id: u8,
        dlc: u8,
        fsm_id: u8,
        fsm_state: u8,
        header_time: u8,
        full_time: u8,
        state_reason: u16,
        offending_byte: u8,
        short_error: u8,
        timeout_during_dlc_detection: u8,
        reserved_lin_receive_error1: u8,
        reserved_lin_receive_error2: u16,
    }

    /// LIN send error (type 15)
    LinSendError {
        channel: u16,
        id: u8,
        dlc: u8,
        fsm_id: u8,
        fsm_state: u8,
        header_time: u8,
        full_time: u8,
    }

    /// LIN slave timeout (type 16)
    LinSlaveTimeout {
        channel: u16,
        slave_id: u8,
        state_id: u8,
        follow_state_id: u32,
    }

    /// LIN scheduler mode change (type 17)
    LinSchedulerModeChange {
        channel: u16,
        old_mode: u8,
        new_mode: u8,
        reserved_lin_scheduler_mode_change: u32,
    }

    /// LIN synchronisation error (type 18)
    LinSyncError {
        channel: u16,
        reserved_lin_sync_error1: u16,
        time_diff: [u16; 4],
    }

    /// LIN baudrate event (type 19)
    LinBaudrateEvent {
        channel: u16,
        reserved_lin_baudrate_event: u16,
        baudrate: i32,
    }

    /// LIN sleep mode event (type 20)
    LinSleepModeEvent {
        channel: u16,
        reason: u8,
        flags: u8,
        reserved_lin_sleep_mode_event: u32,
    }

    /// LIN wakeup event (type 21)
    LinWakeupEvent {
        channel: u16,
        signal: u8,
        external: u8,
        reserved_lin_wakeup_event: u32,
    }

    /// LIN checksum model info (type 42)
    LinChecksumInfo {
        channel: u16,
        id: u8,
        checksum_model: u8,
        reserved_lin_checksum_info: u32,
    }

    /// LIN spike event (type 43)
    LinSpikeEvent {
        channel: u16,
        reserved_lin_spike_event: u16,
        width: u32,
    }

    /// LIN bus statistics (type 54)
    LinStatisticEvent {
        channel: u16,
        reserved_lin_statistic_event1: [u8; 6],
        bus_load: f64,
        bursts_total: u32,
        bursts_overrun: u32,
        frames_sent: u32,
        frames_received: u32,
        frames_unanswered: u32,
        reserved_lin_statistic_event2: u32,
    }

    /// LIN frame with full timing information (type 57)
    LinMessage2 {
        databyte_timestamp_event: LinDatabyteTimestampEvent,
        data: [u8; 8],
        crc: u16,
        dir: u8,
        simulated: u8,
        is_etf: u8,
        etf_assoc_index: u8,
        etf_assoc_etf_id: u8,
        fsm_id: u8,
        fsm_state: u8,
        reserved_lin_message1: u8,
        reserved_lin_message2: u16,
        resp_baudrate: u32,
        exact_header_baudrate: f64,
        early_stopbit_offset: u32,
        early_stopbit_offset_response: u32,
    }

    /// LIN send error (type 58)
    LinSendError2 {
        message_descriptor: LinMessageDescriptor,
        eoh: u64,
        is_etf: u8,
        fsm_id: u8,
        fsm_state: u8,
        reserved_lin_send_error1: u8,
        reserved_lin_send_error2: u32,
        exact_header_baudrate: f64,
        early_stopbit_offset: u32,
        reserved_lin_send_error3: u32,
    }

    /// LIN synchronisation error (type 59)
    LinSyncError2 {
        synch_field_event: LinSynchFieldEvent,
        time_diff: [u16; 4],
    }

    /// LIN checksum error (type 60)
    LinCrcError2 {
        databyte_timestamp_event: LinDatabyteTimestampEvent,
        data: [u8; 8],
        crc: u16,
        dir: u8,
        fsm_id: u8,
        fsm_state: u8,
        simulated: u8,
        reserved_lin_crc_error1: u16,
        resp_baudrate: u32,
        reserved_lin_crc_error2: u32,
        exact_header_baudrate: f64,
        early_stopbit_offset: u32,
        early_stopbit_offset_response: u32,
    }

    /// LIN receive error (type 61)
    LinReceiveError2 {
        databyte_timestamp_event: LinDatabyteTimestampEvent,
        data: [u8; 8],
        fsm_id: u8,
        fsm_state: u8,
        state_reason: u8,
        offending_byte: u8,
        short_error: u8,
        timeout_during_dlc_detection: u8,
        is_etf: u8,
        has_databytes: u8,
        resp_baudrate: u32,
        reserved_lin_receive_error: u32,
        exact_header_baudrate: f64,
        early_stopbit_offset: u32,
        early_stopbit_offset_response: u32,
    }

    /// LIN wakeup event (type 62)
    LinWakeupEvent2 {
        bus_event: LinBusEvent,
        length_info: u8,
        signal: u8,
        external: u8,
        reserved_lin_wakeup_event1: u8,
        reserved_lin_wakeup_event2: u32,
    }

    /// LIN spike event (type 63)
    LinSpikeEvent2 {
        bus_event: LinBusEvent,
        width: u32,
        internal: u8,
        reserved_lin_spike_event1: u8,
        reserved_lin_spike_event2: u16,
    }

    /// LIN long dominant signal (type 64)
    LinLongDomSignalEvent {
        bus_event: LinBusEvent,
        signal_type: u8,
        reserved_lin_long_dom_signal_event1: u8,
        reserved_lin_long_dom_signal_event2: u16,
        reserved_lin_long_dom_signal_event3: u32,
    }

    /// LIN long dominant signal with duration (type 75)
    LinLongDomSignalEvent2 {
        bus_event: LinBusEvent,
        signal_type: u8,
        reserved_lin_long_dom_signal_event1: u8,
        reserved_lin_long_dom_signal_event2: u16,
        reserved_lin_long_dom_signal_event3: u32,
        length: u64,
    }

    /// LIN unexpected wakeup (type 87)
    LinUnexpectedWakeup {
        bus_event: LinBusEvent,
        width: u64,
        signal: u8,
        reserved_lin_unexpected_wakeup: [u8; 7],
    }

    /// LIN short or slow response (type 88)
    LinShortOrSlowResponse {
        databyte_timestamp_event: LinDatabyteTimestampEvent,
        number_of_resp_bytes: u32,
        resp_bytes: [u8; 9],
        slow_response: u8,
        interrupted_by_break: u8,
        reserved_lin_short_or_slow_response: u8,
    }

    /// LIN disturbance event (type 89)
    LinDisturbanceEvent {
        channel: u16,
        id: u8,
        disturbing_frame_id: u8,
        disturbance_type: u32,
        byte_index: u32,
        bit_index: u32,
        bit_offset_in_sixteenth_bits: u32,
        disturbance_length_in_sixteenth_bits: u32,
    }

    /// LIN short or slow response with baudrate (type 105)
    LinShortOrSlowResponse2 {
        databyte_timestamp_event: LinDatabyteTimestampEvent,
        number_of_resp_bytes: u32,
        resp_bytes: [u8; 9],
        slow_response: u8,
        interrupted_by_break: u8,
        reserved_lin_short_or_slow_response1: u8,
        exact_header_baudrate: f64,
        early_stopbit_offset: u32,
        reserved_lin_short_or_slow_response2: u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::wire::Wire;

    #[test]
    fn test_nested_prefix_sizes() {
        assert_eq!(LinBusEvent::SIZE, 16);
        assert_eq!(LinSynchFieldEvent::SIZE, 32);
        assert_eq!(LinMessageDescriptor::SIZE, 40);
        assert_eq!(LinDatabyteTimestampEvent::SIZE, 112);
    }

    #[test]
    fn test_nested_fields_round_trip() {
        let mut event = LinDatabyteTimestampEvent::default();
        event.descriptor.synch_field.bus_event.channel = 3;
        event.descriptor.id = 0x3C;
        event.databyte_timestamps[8] = u64::MAX;

        let mut bytes = Vec::new();
        event.write_to(&mut bytes).unwrap();
        let mut reader = crate::records::wire::ByteReader::new(&bytes, 57);
        assert_eq!(LinDatabyteTimestampEvent::read_from(&mut reader).unwrap(), event);
    }
}
