use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use preprocess::{CpuPreProcessor, InputBuffer, Letterbox};
use schema::BoundingBox;

/// Create raw pixel buffer for benchmarking (gradient pattern)
fn create_test_pixels(width: u32, height: u32) -> Vec<u8> {
    let mut pixels = vec![0u8; (width * height * 3) as usize];
    for y in 0..height {
        for x in 0..width {
            let idx = ((y * width + x) * 3) as usize;
            pixels[idx] = (x % 256) as u8; // R
            pixels[idx + 1] = (y % 256) as u8; // G
            pixels[idx + 2] = ((x + y) % 256) as u8; // B
        }
    }
    pixels
}

fn benchmark_cpu_preprocess(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_preprocess");

    let resolutions = [(640, 480), (1280, 720), (1920, 1080), (3840, 2160)];
    let input_size = 416;

    let mut preprocessor = CpuPreProcessor::new(input_size);

    for quantized in [false, true] {
        let mut buffer = InputBuffer::new(input_size, quantized);
        let label = if quantized { "letterbox_u8" } else { "letterbox_f32" };

        for (width, height) in resolutions.iter() {
            let pixels = create_test_pixels(*width, *height);

            group.bench_with_input(
                BenchmarkId::new(label, format!("{}x{}", width, height)),
                &pixels,
                |b, pixels| {
                    b.iter(|| {
                        preprocessor
                            .preprocess_from_u8_slice(
                                black_box(pixels),
                                black_box(*width),
                                black_box(*height),
                                &mut buffer,
                            )
                            .unwrap()
                    });
                },
            );
        }
    }

    group.finish();
}

fn benchmark_letterbox_inverse(c: &mut Criterion) {
    let letterbox = Letterbox::new(1920, 1080, 416).unwrap();
    let boxes: Vec<BoundingBox> = (0..1000)
        .map(|i| {
            let offset = (i % 300) as f32;
            BoundingBox::new(offset, offset + 60.0, offset + 40.0, offset + 120.0)
        })
        .collect();

    c.bench_function("letterbox_inverse_1000", |b| {
        b.iter(|| {
            black_box(&boxes)
                .iter()
                .map(|bbox| letterbox.inverse(bbox))
                .collect::<Vec<_>>()
        });
    });
}

criterion_group!(benches, benchmark_cpu_preprocess, benchmark_letterbox_inverse);

criterion_main!(benches);
