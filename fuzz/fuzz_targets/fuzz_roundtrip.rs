#![no_main]
use libfuzzer_sys::fuzz_target;
use zenbmp24::*;

fuzz_target!(|data: &[u8]| {
    let limits = Limits {
        max_pixels: Some(1 << 22),
        ..Default::default()
    };
    // If we can decode it, re-encoding and decoding again must produce identical pixels
    let Ok(decoded) = DecodeRequest::new(data)
        .with_limits(&limits)
        .with_permissiveness(Permissiveness::Permissive)
        .decode(enough::Unstoppable)
    else {
        return;
    };

    let reencoded = encode_bmp(decoded.image(), enough::Unstoppable)
        .expect("decoded image must re-encode");
    let Ok(decoded2) = DecodeRequest::new(&reencoded)
        .with_permissiveness(Permissiveness::Strict)
        .decode(enough::Unstoppable)
    else {
        panic!("re-encoded data failed to decode");
    };

    assert_eq!(decoded.image(), decoded2.image(), "roundtrip pixel mismatch");
});
