// Copyright (c) 2022-2025 RBB S.r.l
// opensource@mintlayer.org
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://github.com/mintlayer/mintlayer-core/blob/master/LICENSE
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Conversion of typed keys and values to the bytes stored in the backend

use std::marker::PhantomData;

use parity_scale_codec::{Decode, DecodeAll, Encode};

use crate::Data;

#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum SerializationError {
    #[error("Expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("Invalid UTF-8 string: {0}")]
    InvalidUtf8(String),
    #[error("Decoding failed: {0}")]
    Decode(String),
}

/// Converts values of type `T` to bytes and back.
///
/// Implementations must round-trip: `deserialize(&serialize(v)) == Ok(v)`.
pub trait KvSerializer<T>: Sync {
    fn serialize(&self, value: &T) -> Data;

    fn deserialize(&self, bytes: &[u8]) -> Result<T, SerializationError>;
}

/// A serializer whose output preserves ordering.
///
/// For any `a` and `b`, comparing `serialize(a)` and `serialize(b)` as unsigned byte strings must
/// give the same result as comparing `a` and `b`. Only such serializers can encode column keys.
pub trait KeySerializer<T>: KvSerializer<T> {}

fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N], SerializationError> {
    bytes.try_into().map_err(|_| SerializationError::InvalidLength {
        expected: N,
        actual: bytes.len(),
    })
}

macro_rules! unsigned_serializer {
    ($name:ident, $type:ty) => {
        #[doc = concat!("Fixed width big-endian `", stringify!($type), "`")]
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl KvSerializer<$type> for $name {
            fn serialize(&self, value: &$type) -> Data {
                value.to_be_bytes().to_vec()
            }

            fn deserialize(&self, bytes: &[u8]) -> Result<$type, SerializationError> {
                fixed(bytes).map(<$type>::from_be_bytes)
            }
        }

        impl KeySerializer<$type> for $name {}
    };
}

unsigned_serializer!(U8Serializer, u8);
unsigned_serializer!(U16Serializer, u16);
unsigned_serializer!(U32Serializer, u32);
unsigned_serializer!(U64Serializer, u64);

// Flipping the sign bit maps the signed range monotonically onto the unsigned one
macro_rules! signed_serializer {
    ($name:ident, $type:ty, $unsigned:ty) => {
        #[doc = concat!("Fixed width big-endian `", stringify!($type), "`, sign bit flipped")]
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl $name {
            const SIGN_BIT: $unsigned = 1 << (<$unsigned>::BITS - 1);
        }

        impl KvSerializer<$type> for $name {
            fn serialize(&self, value: &$type) -> Data {
                ((*value as $unsigned) ^ Self::SIGN_BIT).to_be_bytes().to_vec()
            }

            fn deserialize(&self, bytes: &[u8]) -> Result<$type, SerializationError> {
                let raw = <$unsigned>::from_be_bytes(fixed(bytes)?);
                Ok((raw ^ Self::SIGN_BIT) as $type)
            }
        }

        impl KeySerializer<$type> for $name {}
    };
}

signed_serializer!(I32Serializer, i32, u32);
signed_serializer!(I64Serializer, i64, u64);

/// Identity serializer for byte strings
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesSerializer;

impl KvSerializer<Data> for BytesSerializer {
    fn serialize(&self, value: &Data) -> Data {
        value.clone()
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Data, SerializationError> {
        Ok(bytes.to_vec())
    }
}

impl KeySerializer<Data> for BytesSerializer {}

/// 32-byte hashes and roots, stored as they are
#[derive(Debug, Clone, Copy, Default)]
pub struct Bytes32Serializer;

impl KvSerializer<[u8; 32]> for Bytes32Serializer {
    fn serialize(&self, value: &[u8; 32]) -> Data {
        value.to_vec()
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<[u8; 32], SerializationError> {
        fixed(bytes)
    }
}

impl KeySerializer<[u8; 32]> for Bytes32Serializer {}

/// UTF-8 strings. Byte order of UTF-8 matches code point order.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringSerializer;

impl KvSerializer<String> for StringSerializer {
    fn serialize(&self, value: &String) -> Data {
        value.as_bytes().to_vec()
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<String, SerializationError> {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| SerializationError::InvalidUtf8(e.to_string()))
    }
}

impl KeySerializer<String> for StringSerializer {}

/// SCALE encoding of arbitrary domain types.
///
/// The encoding does not preserve ordering so this can only be used for values. Being generic,
/// it is best kept in a `static` so descriptors can refer to it:
///
/// ```
/// # use storage::{schema::Column, serializer::{ScaleSerializer, U64Serializer}};
/// static HEADER: ScaleSerializer<(u32, Vec<u8>)> = ScaleSerializer::new();
/// static HEADERS: Column<u64, (u32, Vec<u8>)> =
///     Column::new(3, "headers", &U64Serializer, &HEADER);
/// ```
pub struct ScaleSerializer<T>(PhantomData<fn() -> T>);

impl<T> ScaleSerializer<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for ScaleSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ScaleSerializer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ScaleSerializer<{}>", std::any::type_name::<T>())
    }
}

impl<T: Encode + Decode> KvSerializer<T> for ScaleSerializer<T> {
    fn serialize(&self, value: &T) -> Data {
        value.encode()
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<T, SerializationError> {
        T::decode_all(&mut &bytes[..]).map_err(|e| SerializationError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use test_utils::random::{make_seedable_rng, Rng, Seed};

    fn round_trip<T: PartialEq + std::fmt::Debug, S: KvSerializer<T>>(ser: &S, value: T) {
        let bytes = ser.serialize(&value);
        assert_eq!(ser.deserialize(&bytes), Ok(value));
    }

    #[test]
    fn unsigned_are_big_endian() {
        assert_eq!(U8Serializer.serialize(&0xab), vec![0xab]);
        assert_eq!(U16Serializer.serialize(&0x0102), vec![0x01, 0x02]);
        assert_eq!(U32Serializer.serialize(&1), vec![0, 0, 0, 1]);
        assert_eq!(
            U64Serializer.serialize(&0x0102030405060708),
            vec![1, 2, 3, 4, 5, 6, 7, 8]
        );
        assert_eq!(U64Serializer.serialize(&(1u64 << 63)), vec![0x80, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn signed_have_sign_bit_flipped() {
        assert_eq!(I32Serializer.serialize(&0), vec![0x80, 0, 0, 0]);
        assert_eq!(I32Serializer.serialize(&-1), vec![0x7f, 0xff, 0xff, 0xff]);
        assert_eq!(I64Serializer.serialize(&i64::MIN), vec![0; 8]);
        assert_eq!(I64Serializer.serialize(&i64::MAX), vec![0xff; 8]);
    }

    #[rstest]
    #[trace]
    #[case(Seed::from_entropy())]
    fn round_trips(#[case] seed: Seed) {
        let mut rng = make_seedable_rng(seed);

        for _ in 0..100 {
            round_trip(&U8Serializer, rng.gen::<u8>());
            round_trip(&U16Serializer, rng.gen::<u16>());
            round_trip(&U32Serializer, rng.gen::<u32>());
            round_trip(&U64Serializer, rng.gen::<u64>());
            round_trip(&I32Serializer, rng.gen::<i32>());
            round_trip(&I64Serializer, rng.gen::<i64>());
            round_trip(&Bytes32Serializer, rng.gen::<[u8; 32]>());
            round_trip(&BytesSerializer, test_utils::random_bytes(&mut rng, 0..100));
        }

        for value in [u64::MIN, 499, 1 << 63, u64::MAX] {
            round_trip(&U64Serializer, value);
        }
        round_trip(&StringSerializer, "čau 🦀".to_owned());
        round_trip(&StringSerializer, String::new());
        round_trip(
            &ScaleSerializer::<(u32, Data, Option<String>)>::new(),
            (7u32, vec![1u8, 2, 3], Some("x".to_owned())),
        );
    }

    fn assert_order_preserved<T, S>(ser: &S, a: T, b: T)
    where
        T: Ord + std::fmt::Debug,
        S: KeySerializer<T>,
    {
        assert_eq!(
            a.cmp(&b),
            ser.serialize(&a).cmp(&ser.serialize(&b)),
            "ordering of {a:?} and {b:?}"
        );
    }

    #[rstest]
    #[trace]
    #[case(Seed::from_entropy())]
    fn order_preserved(#[case] seed: Seed) {
        let mut rng = make_seedable_rng(seed);

        for _ in 0..1000 {
            assert_order_preserved(&U16Serializer, rng.gen::<u16>(), rng.gen());
            assert_order_preserved(&U32Serializer, rng.gen::<u32>(), rng.gen());
            assert_order_preserved(&U64Serializer, rng.gen::<u64>(), rng.gen());
            assert_order_preserved(&I32Serializer, rng.gen::<i32>(), rng.gen());
            assert_order_preserved(&I64Serializer, rng.gen::<i64>(), rng.gen());
            assert_order_preserved(&Bytes32Serializer, rng.gen::<[u8; 32]>(), rng.gen());
        }

        // Across the sign bit of the unsigned and around zero of the signed
        assert_order_preserved(&U64Serializer, (1u64 << 63) - 1, 1 << 63);
        assert_order_preserved(&U64Serializer, 499u64, 1 << 63);
        assert_order_preserved(&I64Serializer, -1i64, 0);
        assert_order_preserved(&I64Serializer, i64::MIN, i64::MAX);
        assert_order_preserved(&StringSerializer, "abc".to_owned(), "abd".to_owned());
        assert_order_preserved(&StringSerializer, "ab".to_owned(), "abc".to_owned());
        assert_order_preserved(&StringSerializer, "z".to_owned(), "ž".to_owned());
    }

    #[rstest]
    #[case(&[])]
    #[case(&[1, 2, 3])]
    #[case(&[0; 9])]
    fn wrong_length_rejected(#[case] bytes: &[u8]) {
        assert_eq!(
            U64Serializer.deserialize(bytes),
            Err(SerializationError::InvalidLength {
                expected: 8,
                actual: bytes.len()
            })
        );
        assert!(Bytes32Serializer.deserialize(bytes).is_err());
    }

    #[test]
    fn invalid_content_rejected() {
        assert!(matches!(
            StringSerializer.deserialize(&[0xff, 0xfe]),
            Err(SerializationError::InvalidUtf8(_))
        ));

        let ser = ScaleSerializer::<(u32, u32)>::new();
        assert!(matches!(ser.deserialize(&[1, 0, 0]), Err(SerializationError::Decode(_))));
        // Trailing garbage
        assert!(matches!(ser.deserialize(&[0; 9]), Err(SerializationError::Decode(_))));
    }

    proptest! {
        #[test]
        fn byte_strings_keep_order(a: Vec<u8>, b: Vec<u8>) {
            let ser = BytesSerializer;
            prop_assert_eq!(a.cmp(&b), ser.serialize(&a).cmp(&ser.serialize(&b)));
        }

        #[test]
        fn strings_keep_order(a in "\\PC{0,8}", b in "\\PC{0,8}") {
            let ser = StringSerializer;
            prop_assert_eq!(a.cmp(&b), ser.serialize(&a).cmp(&ser.serialize(&b)));
            prop_assert_eq!(ser.deserialize(&ser.serialize(&a)), Ok(a));
        }

        #[test]
        fn signed_keep_order(a: i64, b: i64) {
            let ser = I64Serializer;
            prop_assert_eq!(a.cmp(&b), ser.serialize(&a).cmp(&ser.serialize(&b)));
        }
    }
}
