//! Record codec
//!
//! Pure encode/decode of single tagged records; no I/O and no state across
//! calls.
//!
//! # Layout
//!
//! A record is a common object header (see [`header`]) followed by the fixed
//! fields of its kind, then any variable-length payload, then trailing bytes
//! up to `objectSize`. The trailing bytes are kept verbatim in each record's
//! `trailing` field (or in the payload of kinds whose payload takes every
//! unclaimed byte) so that decode followed by encode reproduces the input.
//!
//! # Dispatch
//!
//! [`ObjectType`] lists every known discriminant and [`Record`] has one
//! variant per entry. Decoding looks the discriminant up in that table; a
//! valid header with an unlisted discriminant becomes [`Record::Unknown`],
//! holding the raw bytes for lossless pass-through.
//!
//! # Example
//!
//! ```no_run
//! use blf_engine::records::{decode, ObjectType, Record};
//!
//! let mut record = Record::new(ObjectType::CanMessage);
//! if let Record::CanMessage(msg) = &mut record {
//!     msg.id = 0x123;
//!     msg.dlc = 2;
//!     msg.data[..2].copy_from_slice(&[0xDE, 0xAD]);
//! }
//! let bytes = record.to_bytes().unwrap();
//! assert_eq!(bytes.len(), record.calculate_size());
//! assert_eq!(decode(&bytes).unwrap(), record);
//! ```

#[macro_use]
mod macros;

pub mod header;
pub(crate) mod wire;

mod avionics;
mod can;
mod ethernet;
mod flexray;
mod lin;
mod misc;
mod most;

pub use avionics::*;
pub use can::*;
pub use ethernet::*;
pub use flexray::*;
pub use header::{BaseHeader, ObjectHeader, BASE_HEADER_SIZE, OBJECT_SIGNATURE};
pub use lin::*;
pub use misc::*;
pub use most::*;

use crate::config::Strictness;
use crate::types::{BlfError, Result};
use byteorder::{ByteOrder, LittleEndian};
use std::io::Write;
use wire::{length_field, ByteReader, RecordBody};

macro_rules! blf_registry {
    ($($variant:ident = $tag:literal => $ty:ident,)*) => {
        /// Known object types, keyed by their on-disk discriminant
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u32)]
        pub enum ObjectType {
            $($variant = $tag,)*
        }

        impl ObjectType {
            /// Every known object type in discriminant order
            pub const ALL: &'static [ObjectType] = &[$(ObjectType::$variant,)*];

            pub fn from_u32(value: u32) -> Option<Self> {
                match value {
                    $($tag => Some(ObjectType::$variant),)*
                    _ => None,
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(ObjectType::$variant => stringify!($variant),)*
                }
            }
        }

        /// One decoded record
        #[derive(Debug, Clone, PartialEq)]
        pub enum Record {
            $($variant($ty),)*
            /// Valid header with an unrecognized object type
            Unknown(UnknownObject),
        }

        impl Record {
            /// Create a zero-initialised record of the given kind
            pub fn new(kind: ObjectType) -> Self {
                match kind {
                    $(ObjectType::$variant => Record::$variant(<$ty>::default()),)*
                }
            }

            /// Known kind, or `None` for unknown records
            pub fn kind(&self) -> Option<ObjectType> {
                match self {
                    $(Record::$variant(_) => Some(ObjectType::$variant),)*
                    Record::Unknown(_) => None,
                }
            }

            pub fn header(&self) -> Option<&ObjectHeader> {
                match self {
                    $(Record::$variant(r) => Some(&r.header),)*
                    Record::Unknown(_) => None,
                }
            }

            pub fn header_mut(&mut self) -> Option<&mut ObjectHeader> {
                match self {
                    $(Record::$variant(r) => Some(&mut r.header),)*
                    Record::Unknown(_) => None,
                }
            }

            /// Encoded length in bytes, recomputed from the current contents
            pub fn calculate_size(&self) -> usize {
                match self {
                    $(Record::$variant(r) => r.header.header_size() as usize + r.body_size(),)*
                    Record::Unknown(u) => u.bytes.len(),
                }
            }

            /// Encode into `writer`, returning the number of bytes written
            pub fn encode<W: Write>(&self, writer: &mut W) -> Result<usize> {
                match self {
                    $(Record::$variant(r) => encode_known(r, $tag, writer),)*
                    Record::Unknown(u) => {
                        writer.write_all(&u.bytes)?;
                        Ok(u.bytes.len())
                    }
                }
            }

            fn decode_known(
                kind: ObjectType,
                header: ObjectHeader,
                reader: &mut ByteReader<'_>,
            ) -> Result<Self> {
                match kind {
                    $(ObjectType::$variant => {
                        <$ty as RecordBody>::decode_body(header, reader).map(Record::$variant)
                    })*
                }
            }
        }
    };
}

blf_registry! {
    CanMessage = 1 => CanMessage,
    CanErrorFrame = 2 => CanErrorFrame,
    CanOverloadFrame = 3 => CanOverloadFrame,
    CanDriverStatistic = 4 => CanDriverStatistic,
    AppTrigger = 5 => AppTrigger,
    EnvInteger = 6 => EnvironmentVariable,
    EnvDouble = 7 => EnvironmentVariable,
    EnvString = 8 => EnvironmentVariable,
    EnvData = 9 => EnvironmentVariable,
    LinMessage = 11 => LinMessage,
    LinCrcError = 12 => LinCrcError,
    LinDlcInfo = 13 => LinDlcInfo,
    LinReceiveError = 14 => LinReceiveError,
    LinSendError = 15 => LinSendError,
    LinSlaveTimeout = 16 => LinSlaveTimeout,
    LinSchedulerModeChange = 17 => LinSchedulerModeChange,
    LinSyncError = 18 => LinSyncError,
    LinBaudrateEvent = 19 => LinBaudrateEvent,
    LinSleepModeEvent = 20 => LinSleepModeEvent,
    LinWakeupEvent = 21 => LinWakeupEvent,
    MostSpy = 22 => MostSpy,
    MostCtrl = 23 => MostCtrl,
    MostLightLock = 24 => MostLightLock,
    MostStatistic = 25 => MostStatistic,
    FlexRayData = 29 => FlexRayData,
    FlexRaySync = 30 => FlexRaySync,
    CanDriverError = 31 => CanDriverError,
    MostPkt = 32 => MostPkt,
    MostPkt2 = 33 => MostPkt2,
    MostHwMode = 34 => MostHwMode,
    MostReg = 35 => MostReg,
    MostGenReg = 36 => MostGenReg,
    MostNetState = 37 => MostNetState,
    MostDataLost = 38 => MostDataLost,
    MostTrigger = 39 => MostTrigger,
    FlexRayV6StartCycleEvent = 40 => FlexRayV6StartCycleEvent,
    FlexRayV6Message = 41 => FlexRayV6Message,
    LinChecksumInfo = 42 => LinChecksumInfo,
    LinSpikeEvent = 43 => LinSpikeEvent,
    CanDriverHwSync = 44 => CanDriverHwSync,
    FlexRayStatusEvent = 45 => FlexRayStatusEvent,
    GpsEvent = 46 => GpsEvent,
    FlexRayVFrError = 47 => FlexRayVFrError,
    FlexRayVFrStatus = 48 => FlexRayVFrStatus,
    FlexRayVFrStartCycle = 49 => FlexRayVFrStartCycle,
    FlexRayVFrReceiveMsg = 50 => FlexRayVFrReceiveMsg,
    RealtimeClock = 51 => RealtimeClock,
    LinStatisticEvent = 54 => LinStatisticEvent,
    J1708Message = 55 => J1708Message,
    J1708VirtualMessage = 56 => J1708Message,
    LinMessage2 = 57 => LinMessage2,
    LinSendError2 = 58 => LinSendError2,
    LinSyncError2 = 59 => LinSyncError2,
    LinCrcError2 = 60 => LinCrcError2,
    LinReceiveError2 = 61 => LinReceiveError2,
    LinWakeupEvent2 = 62 => LinWakeupEvent2,
    LinSpikeEvent2 = 63 => LinSpikeEvent2,
    LinLongDomSignalEvent = 64 => LinLongDomSignalEvent,
    AppText = 65 => AppText,
    FlexRayVFrReceiveMsgEx = 66 => FlexRayVFrReceiveMsgEx,
    MostStatisticEx = 67 => MostStatisticEx,
    MostTxLight = 68 => MostTxLight,
    MostAllocTab = 69 => MostAllocTab,
    MostStress = 70 => MostStress,
    EthernetFrame = 71 => EthernetFrame,
    SystemVariable = 72 => SystemVariable,
    CanErrorFrameExt = 73 => CanErrorFrameExt,
    CanDriverErrorExt = 74 => CanDriverErrorExt,
    LinLongDomSignalEvent2 = 75 => LinLongDomSignalEvent2,
    Most150Message = 76 => Most150Message,
    Most150Pkt = 77 => Most150Pkt,
    MostEthernetPkt = 78 => MostEthernetPkt,
    Most150MessageFragment = 79 => Most150MessageFragment,
    Most150PktFragment = 80 => Most150PktFragment,
    MostEthernetPktFragment = 81 => MostEthernetPktFragment,
    MostSystemEvent = 82 => MostSystemEvent,
    Most150AllocTab = 83 => Most150AllocTab,
    Most50Message = 84 => Most50Message,
    Most50Pkt = 85 => Most50Pkt,
    CanMessage2 = 86 => CanMessage2,
    LinUnexpectedWakeup = 87 => LinUnexpectedWakeup,
    LinShortOrSlowResponse = 88 => LinShortOrSlowResponse,
    LinDisturbanceEvent = 89 => LinDisturbanceEvent,
    SerialEvent = 90 => SerialEvent,
    DriverOverrun = 91 => DriverOverrun,
    EventComment = 92 => EventComment,
    WlanFrame = 93 => WlanFrame,
    WlanStatistic = 94 => WlanStatistic,
    MostEcl = 95 => MostEcl,
    GlobalMarker = 96 => GlobalMarker,
    AfdxFrame = 97 => AfdxFrame,
    AfdxStatistic = 98 => AfdxStatistic,
    KLineStatusEvent = 99 => KLineStatusEvent,
    CanFdMessage = 100 => CanFdMessage,
    CanFdMessage64 = 101 => CanFdMessage64,
    EthernetRxError = 102 => EthernetRxError,
    EthernetStatus = 103 => EthernetStatus,
    CanFdErrorFrame64 = 104 => CanFdErrorFrame64,
    LinShortOrSlowResponse2 = 105 => LinShortOrSlowResponse2,
    AfdxStatus = 106 => AfdxStatus,
    AfdxBusStatistic = 107 => AfdxBusStatistic,
    AfdxErrorEvent = 109 => AfdxErrorEvent,
    A429Error = 110 => A429Error,
    A429Status = 111 => A429Status,
    A429BusStatistic = 112 => A429BusStatistic,
    A429Message = 113 => A429Message,
    EthernetStatistic = 114 => EthernetStatistic,
    RestorePointContainer = 115 => RestorePointContainer,
    TestStructure = 118 => TestStructure,
    DiagRequestInterpretation = 119 => DiagRequestInterpretation,
    EthernetFrameEx = 120 => EthernetFrameEx,
    EthernetFrameForwarded = 121 => EthernetFrameForwarded,
    EthernetErrorEx = 122 => EthernetErrorEx,
    EthernetErrorForwarded = 123 => EthernetErrorForwarded,
    FunctionBus = 124 => FunctionBus,
    DataLostBegin = 125 => DataLostBegin,
    DataLostEnd = 126 => DataLostEnd,
    WaterMarkEvent = 127 => WaterMarkEvent,
    TriggerCondition = 128 => TriggerCondition,
    CanSettingChanged = 129 => CanSettingChanged,
    DistributedObjectMember = 130 => DistributedObjectMember,
    AttributeEvent = 131 => AttributeEvent,
}

impl Record {
    /// On-disk discriminant
    pub fn object_type(&self) -> u32 {
        match self {
            Record::Unknown(u) => u.object_type(),
            known => known.kind().map(|kind| kind as u32).unwrap_or_default(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().map(ObjectType::name).unwrap_or("Unknown")
    }

    /// Timestamp in nanoseconds, taken from the object header
    pub fn timestamp_ns(&self) -> Option<u64> {
        match self {
            Record::Unknown(u) => u.header().map(|h| h.timestamp_ns()),
            known => known.header().map(ObjectHeader::timestamp_ns),
        }
    }

    /// Encode into a fresh buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.calculate_size());
        self.encode(&mut out)?;
        Ok(out)
    }
}

fn encode_known<T: RecordBody, W: Write>(
    record: &T,
    object_type: u32,
    writer: &mut W,
) -> Result<usize> {
    let header = record.header();
    let object_size = header.header_size() as usize + record.body_size();
    let base = BaseHeader {
        header_size: header.header_size(),
        header_version: header.version(),
        object_size: length_field(object_size, "objectSize")?,
        object_type,
    };
    base.write_to(writer)?;
    header.write_to(writer)?;
    record.encode_body(writer)?;
    Ok(object_size)
}

/// Raw bytes of a record whose object type this codec does not know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownObject {
    bytes: Vec<u8>,
}

impl UnknownObject {
    /// Wrap the complete bytes of one record.
    ///
    /// The bytes must start with a valid object header whose `objectSize`
    /// equals their length.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let base = BaseHeader::parse(&bytes)?;
        if base.object_size as usize != bytes.len() {
            return Err(BlfError::CorruptHeader(format!(
                "object size {} does not match {} raw bytes",
                base.object_size,
                bytes.len()
            )));
        }
        Ok(Self { bytes })
    }

    pub fn object_type(&self) -> u32 {
        LittleEndian::read_u32(&self.bytes[12..16])
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Parse the header extension, if the raw bytes still hold one
    pub fn header(&self) -> Option<ObjectHeader> {
        let base = BaseHeader::parse(&self.bytes).ok()?;
        let ext = self.bytes.get(BASE_HEADER_SIZE..base.header_size as usize)?;
        let mut reader = ByteReader::new(ext, base.object_type);
        ObjectHeader::read(base.header_version, &mut reader).ok()
    }
}

/// Decode the record at the start of `buf` in strict mode
pub fn decode(buf: &[u8]) -> Result<Record> {
    decode_with(buf, Strictness::Strict)
}

/// Decode the record at the start of `buf`.
///
/// `buf` may extend past the record; exactly `objectSize` bytes are consumed.
/// In lenient mode a known record whose body is too short for its fixed
/// fields is returned as [`Record::Unknown`] instead of failing.
pub fn decode_with(buf: &[u8], strictness: Strictness) -> Result<Record> {
    let base = BaseHeader::parse(buf)?;
    let object_size = base.object_size as usize;
    if buf.len() < object_size {
        return Err(BlfError::TruncatedRecord {
            object_type: base.object_type,
            needed: object_size,
            available: buf.len(),
        });
    }
    let object = &buf[..object_size];

    let kind = match ObjectType::from_u32(base.object_type) {
        Some(kind) => kind,
        None => {
            log::trace!(
                "Unknown object type {} ({} bytes), passing through",
                base.object_type,
                object_size
            );
            return Ok(Record::Unknown(UnknownObject {
                bytes: object.to_vec(),
            }));
        }
    };

    let header_size = base.header_size as usize;
    let mut header_reader = ByteReader::new(&object[BASE_HEADER_SIZE..header_size], base.object_type);
    let header = ObjectHeader::read(base.header_version, &mut header_reader)?;

    let mut reader = ByteReader::new(&object[header_size..], base.object_type);
    match Record::decode_known(kind, header, &mut reader) {
        Err(BlfError::TruncatedRecord { needed, available, .. })
            if strictness == Strictness::Lenient =>
        {
            log::warn!(
                "{} record too short ({} of {} bytes), keeping it raw",
                kind.name(),
                available,
                needed
            );
            Ok(Record::Unknown(UnknownObject {
                bytes: object.to_vec(),
            }))
        }
        other => other,
    }
}
