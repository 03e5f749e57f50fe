#![no_main]
use libfuzzer_sys::fuzz_target;
use zenbmp24::{DecodeRequest, Limits, Permissiveness};

fuzz_target!(|data: &[u8]| {
    let limits = Limits {
        max_pixels: Some(1 << 22),
        ..Default::default()
    };
    // Every mode must return cleanly, never panic
    for p in [
        Permissiveness::Strict,
        Permissiveness::Standard,
        Permissiveness::Permissive,
    ] {
        let _ = DecodeRequest::new(data)
            .with_limits(&limits)
            .with_permissiveness(p)
            .decode(enough::Unstoppable);
    }
    let _ = zenbmp24::probe(data);
    let _ = zenbmp24::read_bmp(&mut &data[..]);
});
