// nom parsers for telemetry record fields

use super::tags::TypeTag;
use super::value::WireValue;
use nom::{
    combinator::map,
    multi::length_data,
    number::complete::{
        be_f32, be_f64, be_i16, be_i32, be_i64, be_i8, be_u16, be_u32, be_u64, be_u8,
    },
    IResult, Parser,
};

/// Parse the field header: 4-byte big-endian key hash and the raw tag byte
pub fn parse_field_header(input: &[u8]) -> IResult<&[u8], (u32, u8)> {
    (be_u32, be_u8).parse(input)
}

/// Parse a length-prefixed string, replacing invalid UTF-8
pub fn parse_string(input: &[u8]) -> IResult<&[u8], String> {
    map(length_data(be_u8), |bytes: &[u8]| {
        String::from_utf8_lossy(bytes).into_owned()
    })
    .parse(input)
}

/// Parse the payload that follows a header carrying `tag`
pub fn parse_value(tag: TypeTag, input: &[u8]) -> IResult<&[u8], WireValue> {
    match tag {
        TypeTag::String => map(parse_string, WireValue::String).parse(input),
        TypeTag::Int8 => map(be_i8, WireValue::Int8).parse(input),
        TypeTag::UInt8 => map(be_u8, WireValue::UInt8).parse(input),
        TypeTag::Int16 => map(be_i16, WireValue::Int16).parse(input),
        TypeTag::UInt16 => map(be_u16, WireValue::UInt16).parse(input),
        TypeTag::Int32 => map(be_i32, WireValue::Int32).parse(input),
        TypeTag::UInt32 => map(be_u32, WireValue::UInt32).parse(input),
        TypeTag::Int64 => map(be_i64, WireValue::Int64).parse(input),
        TypeTag::UInt64 => map(be_u64, WireValue::UInt64).parse(input),
        TypeTag::Float32 => map(be_f32, WireValue::Float32).parse(input),
        TypeTag::Float64 => map(be_f64, WireValue::Float64).parse(input),
    }
}
