//! Application, environment and bookkeeping record layouts

blf_records! {
    /// Trigger block activity (type 5)
    AppTrigger {
        pre_trigger_time: u64,
        post_trigger_time: u64,
        channel: u16,
        flags: u16,
        app_specific2: u32,
    }

    /// Environment variable change (types 6-9)
    EnvironmentVariable {
        name_length: len(u32 => name),
        data_length: len(u32 => data),
        reserved_environment_variable: u64,
        name: bytes(name_length),
        data: bytes(data_length),
    }

    /// GPS fix (type 46)
    GpsEvent {
        flags: u32,
        channel: u16,
        reserved_gps_event: u16,
        latitude: f64,
        longitude: f64,
        altitude: f64,
        speed: f64,
        course: f64,
    }

    /// Realtime clock (type 51)
    RealtimeClock {
        time: u64,
        logging_offset: u64,
    }

    /// J1708 message (types 55 and 56)
    J1708Message {
        channel: u16,
        dir: u8,
        reserved_j1708_message1: u8,
        error: u16,
        size: u8,
        data: [u8; 255],
        reserved_j1708_message2: u16,
    }

    /// Free text from the logging application (type 65)
    AppText {
        source: u32,
        reserved_app_text1: u32,
        text_length: len(u32 => text),
        reserved_app_text2: u32,
        text: bytes(text_length),
    }

    /// System variable change (type 72)
    SystemVariable {
        variable_type: u32,
        representation: u32,
        reserved_system_variable1: u64,
        name_length: len(u32 => name),
        data_length: len(u32 => data),
        reserved_system_variable2: u64,
        name: bytes(name_length),
        data: bytes(data_length),
    }

    /// Serial port event; the general/compact/single variants stay raw (type 90)
    SerialEvent {
        flags: u32,
        port: u32,
        baudrate: u32,
        reserved_serial_event: u32,
        event_data: rest,
    }

    /// Receive queue overrun (type 91)
    DriverOverrun {
        bus_type: u32,
        channel: u16,
        reserved_driver_overrun: u16,
    }

    /// Comment attached to another event (type 92)
    EventComment {
        commented_event_type: u32,
        text_length: len(u32 => text),
        reserved_event_comment: u64,
        text: bytes(text_length),
    }

    /// Marker placed in the measurement (type 96)
    GlobalMarker {
        commented_event_type: u32,
        foreground_color: u32,
        background_color: u32,
        is_relocatable: u8,
        reserved_global_marker1: u8,
        reserved_global_marker2: u16,
        group_name_length: len(u32 => group_name),
        marker_name_length: len(u32 => marker_name),
        description_length: len(u32 => description),
        reserved_global_marker3: u32,
        reserved_global_marker4: u64,
        group_name: bytes(group_name_length),
        marker_name: bytes(marker_name_length),
        description: bytes(description_length),
    }

    /// K-Line status (type 99)
    KLineStatusEvent {
        status_type: u16,
        data_len: u16,
        port: u32,
        reserved_k_line_status_event: u64,
        data: [u64; 3],
    }

    /// Embedded restore-point data (type 115)
    RestorePointContainer {
        reserved_restore_point_container: [u8; 14],
        data_length: len(u16 => data),
        data: bytes(data_length),
    }

    /// Test module result (type 118)
    TestStructure {
        executing_object_identity: u32,
        test_type: u16,
        reserved_test_structure: u16,
        unique_no: u32,
        action: u32,
        result: u32,
        executing_object_name_length: len(u32 => executing_object_name),
        name_length: len(u32 => name),
        text_length: len(u32 => text),
        executing_object_name: wide(executing_object_name_length),
        name: wide(name_length),
        text: wide(text_length),
    }

    /// Diagnostic request interpretation (type 119)
    DiagRequestInterpretation {
        diag_description_handle: u32,
        diag_variant_handle: u32,
        diag_service_handle: u32,
        ecu_qualifier_length: len(u32 => ecu_qualifier),
        variant_qualifier_length: len(u32 => variant_qualifier),
        service_qualifier_length: len(u32 => service_qualifier),
        ecu_qualifier: bytes(ecu_qualifier_length),
        variant_qualifier: bytes(variant_qualifier_length),
        service_qualifier: bytes(service_qualifier_length),
    }

    /// Function bus value (type 124)
    FunctionBus {
        function_bus_object_type: u32,
        ve_type: u32,
        name_length: len(u32 => name),
        data_length: len(u32 => data),
        name: bytes(name_length),
        data: bytes(data_length),
    }

    /// Start of a logging data loss (type 125)
    DataLostBegin {
        queue_identifier: u32,
    }

    /// End of a logging data loss (type 126)
    DataLostEnd {
        queue_identifier: u32,
        first_object_lost_time_stamp: u64,
        number_of_lost_events: u32,
    }

    /// Logger queue fill level (type 127)
    WaterMarkEvent {
        queue_state: u32,
    }

    /// Trigger condition state (type 128)
    TriggerCondition {
        state: u32,
        trigger_block_name_length: len(u32 => trigger_block_name),
        trigger_condition_length: len(u32 => trigger_condition),
        trigger_block_name: bytes(trigger_block_name_length),
        trigger_condition: bytes(trigger_condition_length),
    }

    /// Member value of a distributed object (type 130)
    DistributedObjectMember {
        member_type: u32,
        detail_type: u32,
        path_length: len(u32 => path),
        data_length: len(u32 => data),
        path: bytes(path_length),
        data: bytes(data_length),
    }

    /// Attribute value of a communication object (type 131)
    AttributeEvent {
        main_attributable_object_path_length: len(u32 => main_attributable_object_path),
        member_path_length: len(u32 => member_path),
        attribute_definition_path_length: len(u32 => attribute_definition_path),
        data_length: len(u32 => data),
        main_attributable_object_path: bytes(main_attributable_object_path_length),
        member_path: bytes(member_path_length),
        attribute_definition_path: bytes(attribute_definition_path_length),
        data: bytes(data_length),
    }
}
